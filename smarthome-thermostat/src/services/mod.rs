pub mod control;
mod observer_service;
mod room_store;
mod thermostat_service;

pub use control::ControlParams;
pub use observer_service::*;
pub use room_store::*;
pub use thermostat_service::*;
