mod notifier;
mod window_service;

pub use notifier::*;
pub use window_service::*;
