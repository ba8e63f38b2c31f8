mod sse_handle;
mod thermostat_handle;

pub use sse_handle::*;
pub use thermostat_handle::*;
