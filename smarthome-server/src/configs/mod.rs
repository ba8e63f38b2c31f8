mod schema;
mod settings;
mod storage;

pub use schema::SchemaManager;
pub use settings::{Bootstrap, BootstrapDevice, Database, Launcher, LauncherMode, Logger, RoomDefaults, Server, Settings};
pub use storage::Storage;
