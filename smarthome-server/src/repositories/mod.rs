mod device;
mod room;

pub use device::DeviceRepository;
pub use room::RoomRepository;
