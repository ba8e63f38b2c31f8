use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use smarthome_api::models::{DeviceType, Id};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub migration_path: Option<String>,
    pub clean_start: bool,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LauncherMode {
    /// Spawn one local process per registered device
    Process,
    /// Devices are started elsewhere; only their addresses are derived
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Launcher {
    pub mode: LauncherMode,
    pub thermostat_binary: String,
    pub window_contact_binary: String,
    /// Host devices are reachable on. Supports a `{name}` placeholder that is
    /// replaced with the device name, e.g. `web-service-{name}`.
    pub device_host: String,
    pub thermostat_base_port: u16,
    pub window_contact_base_port: u16,
    /// Url devices use to reach this registry
    pub registry_url: String,
    pub request_timeout_ms: u64,
}

impl Launcher {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoomDefaults {
    pub room_temperature: f64,
    pub reduced_temperature: f64,
    pub current_temperature: f64,
}

impl Default for RoomDefaults {
    fn default() -> Self {
        Self {
            room_temperature: 22.0,
            reduced_temperature: 18.0,
            current_temperature: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapDevice {
    pub device_id: Id,
    pub device_type: DeviceType,
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bootstrap {
    #[serde(default)]
    pub devices: Vec<BootstrapDevice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    pub launcher: Launcher,
    #[serde(default)]
    pub rooms: RoomDefaults,
    #[serde(default)]
    pub bootstrap: Bootstrap,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("configs/server"))
            .add_source(File::with_name(&format!("configs/server-{run_mode}")).required(false))
            .add_source(Environment::with_prefix("SMARTHOME").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Some(migrate) = &settings.database.migration_path {
            if Path::new(migrate).is_dir() {
                let migrate_path = normalize_path(migrate)
                    .map_err(|e| ConfigError::Message(e.to_string()))?
                    .to_string_lossy()
                    .to_string();

                settings.database.migration_path = Some(migrate_path);
            } else {
                settings.database.migration_path = None;
            }
        }

        Ok(settings)
    }
}

fn normalize_path(path: &str) -> std::io::Result<PathBuf> {
    let path_buf = PathBuf::from(path);

    Ok(if path_buf.is_absolute() {
        path_buf
    } else {
        env::current_dir()?.join(path_buf)
    })
}
