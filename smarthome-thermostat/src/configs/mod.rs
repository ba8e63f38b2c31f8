mod settings;

pub use settings::{Device, Logger, Observers, Server, Settings, Simulation, Store};
