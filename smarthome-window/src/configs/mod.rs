mod settings;

pub use settings::{Device, Logger, Notify, Server, Settings, Window};
