mod device;
mod room;
mod thermostat;
mod window;

pub use device::*;
pub use room::*;
pub use thermostat::*;
pub use window::*;

pub type Id = i32;
