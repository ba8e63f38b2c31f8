use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::services::ControlParams;

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
pub struct Simulation {
    pub default_temperature: f64,
    pub room_temperature: f64,
    pub reduced_temperature: f64,
    pub tick_interval_ms: u64,
    pub closed_cooling_rate: f64,
    pub open_cooling_rate: f64,
    pub derivative_gain: f64,
    pub max_delta: f64,
}

impl Simulation {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn control_params(&self) -> ControlParams {
        ControlParams {
            closed_cooling_rate: self.closed_cooling_rate,
            open_cooling_rate: self.open_cooling_rate,
            derivative_gain: self.derivative_gain,
            max_delta: self.max_delta,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    /// Registry base url; without one the thermostat simulates against an
    /// in-process room store.
    pub url: Option<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observers {
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub device: Device,
    pub simulation: Simulation,
    pub store: Store,
    pub observers: Observers,
}

/// Flat variables set by the device launcher, mapped onto settings keys.
const LAUNCHER_VARIABLES: [(&str, &str); 7] = [
    ("THERMOSTAT_ID", "device.id"),
    ("ROOM_ID", "device.room_id"),
    ("PORT", "server.port"),
    ("DEFAULT_TEMPERATURE", "simulation.default_temperature"),
    ("ROOM_TEMPERATURE", "simulation.room_temperature"),
    ("REDUCED_TEMPERATURE", "simulation.reduced_temperature"),
    ("STORE_URL", "store.url"),
];

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 6001)?
            .set_default("logger.level", "info")?
            .set_default("device.id", "1")?
            .set_default("device.room_id", "none")?
            .set_default("simulation.default_temperature", 22.0)?
            .set_default("simulation.room_temperature", 22.0)?
            .set_default("simulation.reduced_temperature", 18.0)?
            .set_default("simulation.tick_interval_ms", 1000)?
            .set_default("simulation.closed_cooling_rate", 0.01)?
            .set_default("simulation.open_cooling_rate", 0.08)?
            .set_default("simulation.derivative_gain", 0.5)?
            .set_default("simulation.max_delta", 10.0)?
            .set_default("store.timeout_ms", 800)?
            .set_default("observers.capacity", 16)?
            .add_source(File::with_name("configs/thermostat").required(false))
            .add_source(File::with_name(&format!("configs/thermostat-{run_mode}")).required(false))
            .add_source(Environment::with_prefix("THERMOSTAT").separator("__"));

        for (variable, key) in LAUNCHER_VARIABLES {
            builder = builder.set_override_option(key, env::var(variable).ok())?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;

        if settings.simulation.max_delta <= 0.0 {
            return Err(ConfigError::Message(
                "simulation.max_delta must be positive".to_string(),
            ));
        }

        Ok(settings)
    }
}
