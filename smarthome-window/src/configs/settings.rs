use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use smarthome_api::models::WindowStatus;

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
pub struct Device {
    pub id: String,
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Window {
    pub default_mode: WindowStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notify {
    /// Thermostat base urls known at launch
    pub thermostat_urls: Vec<String>,
    /// Registry consulted for thermostats added to the room later
    pub registry_url: Option<String>,
    pub timeout_ms: u64,
}

impl Notify {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub device: Device,
    pub window: Window,
    pub notify: Notify,
}

/// Flat variables set by the device launcher, mapped onto settings keys.
const LAUNCHER_VARIABLES: [(&str, &str); 5] = [
    ("WINDOW_CONTACT_ID", "device.id"),
    ("ROOM_ID", "device.room_id"),
    ("PORT", "server.port"),
    ("DEFAULT_MODE", "window.default_mode"),
    ("REGISTRY_URL", "notify.registry_url"),
];

pub fn split_urls(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3021)?
            .set_default("logger.level", "info")?
            .set_default("device.id", "1")?
            .set_default("device.room_id", "none")?
            .set_default("window.default_mode", "closed")?
            .set_default("notify.thermostat_urls", Vec::<String>::new())?
            .set_default("notify.timeout_ms", 800)?
            .add_source(File::with_name("configs/window").required(false))
            .add_source(File::with_name(&format!("configs/window-{run_mode}")).required(false))
            .add_source(Environment::with_prefix("WINDOW").separator("__"));

        for (variable, key) in LAUNCHER_VARIABLES {
            builder = builder.set_override_option(key, env::var(variable).ok())?;
        }

        if let Ok(urls) = env::var("THERMOSTAT_URLS") {
            builder = builder.set_override("notify.thermostat_urls", split_urls(&urls))?;
        }

        builder.build()?.try_deserialize()
    }
}
