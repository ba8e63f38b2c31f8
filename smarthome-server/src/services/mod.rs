mod device_client;
mod launcher_service;
mod registry_service;

pub use device_client::*;
pub use launcher_service::*;
pub use registry_service::*;
