mod device_handle;
mod room_handle;
mod thermostat_handle;
mod window_handle;

pub use device_handle::*;
pub use room_handle::*;
pub use thermostat_handle::*;
pub use window_handle::*;
