use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use smarthome_api::models::{DeviceType, Id, WindowStatus};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::configs::{Launcher, RoomDefaults};

/// Everything a device instance needs to know about itself at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSpec {
    pub device_type: DeviceType,
    pub device_id: Id,
    pub room_id: Option<String>,
    /// Thermostats a window contact notifies on every mode change
    pub thermostat_urls: Vec<String>,
}

impl DeviceSpec {
    pub fn new(device_type: DeviceType, device_id: Id, room_id: Option<String>) -> Self {
        Self {
            device_type,
            device_id,
            room_id,
            thermostat_urls: Vec::new(),
        }
    }

    pub fn name(&self) -> String {
        device_name(self.device_type, self.device_id)
    }
}

pub fn device_name(device_type: DeviceType, device_id: Id) -> String {
    match device_type {
        DeviceType::Thermostat => format!("thermostat-{device_id}"),
        DeviceType::WindowContact => format!("window-contact-{device_id}"),
    }
}

#[async_trait]
pub trait DeviceLauncher: Send + Sync {
    /// Base url the device instance answers on.
    fn address(&self, device_type: DeviceType, device_id: Id) -> String;

    async fn launch(&self, spec: &DeviceSpec) -> Result<()>;

    /// Returns false when no instance was running.
    async fn stop(&self, device_type: DeviceType, device_id: Id) -> Result<bool>;
}

fn port_for(settings: &Launcher, device_type: DeviceType, device_id: Id) -> Result<u16> {
    let base = match device_type {
        DeviceType::Thermostat => settings.thermostat_base_port,
        DeviceType::WindowContact => settings.window_contact_base_port,
    };

    u16::try_from(device_id)
        .ok()
        .and_then(|id| base.checked_add(id))
        .with_context(|| format!("no port available for {}", device_name(device_type, device_id)))
}

fn address_for(settings: &Launcher, device_type: DeviceType, device_id: Id) -> String {
    let host = settings
        .device_host
        .replace("{name}", &device_name(device_type, device_id));
    let port = port_for(settings, device_type, device_id).unwrap_or(0);

    format!("http://{host}:{port}")
}

/// Starts every device as a child process of the registry.
pub struct ProcessLauncher {
    settings: Launcher,
    rooms: RoomDefaults,
    children: Mutex<HashMap<(DeviceType, Id), Child>>,
}

impl ProcessLauncher {
    pub fn new(settings: Launcher, rooms: RoomDefaults) -> Self {
        Self {
            settings,
            rooms,
            children: Mutex::new(HashMap::new()),
        }
    }

    fn command(&self, spec: &DeviceSpec) -> Result<Command> {
        let port = port_for(&self.settings, spec.device_type, spec.device_id)?;
        let room_id = spec.room_id.clone().unwrap_or_default();

        let mut command = match spec.device_type {
            DeviceType::Thermostat => {
                let mut command = Command::new(&self.settings.thermostat_binary);
                command
                    .env("THERMOSTAT_ID", spec.device_id.to_string())
                    .env("DEFAULT_TEMPERATURE", self.rooms.current_temperature.to_string())
                    .env("ROOM_TEMPERATURE", self.rooms.room_temperature.to_string())
                    .env("REDUCED_TEMPERATURE", self.rooms.reduced_temperature.to_string())
                    .env("STORE_URL", &self.settings.registry_url);
                command
            }
            DeviceType::WindowContact => {
                let mut command = Command::new(&self.settings.window_contact_binary);
                command
                    .env("WINDOW_CONTACT_ID", spec.device_id.to_string())
                    .env("DEFAULT_MODE", WindowStatus::Closed.to_string())
                    .env("THERMOSTAT_URLS", spec.thermostat_urls.join(","))
                    .env("REGISTRY_URL", &self.settings.registry_url);
                command
            }
        };

        command
            .env("ROOM_ID", room_id)
            .env("PORT", port.to_string())
            .kill_on_drop(true);

        Ok(command)
    }
}

#[async_trait]
impl DeviceLauncher for ProcessLauncher {
    fn address(&self, device_type: DeviceType, device_id: Id) -> String {
        address_for(&self.settings, device_type, device_id)
    }

    async fn launch(&self, spec: &DeviceSpec) -> Result<()> {
        let key = (spec.device_type, spec.device_id);
        let mut children = self.children.lock().await;

        if let Some(child) = children.get_mut(&key) {
            if child.try_wait()?.is_none() {
                tracing::debug!("{} already running", spec.name());
                return Ok(());
            }
        }

        let child = self
            .command(spec)?
            .spawn()
            .with_context(|| format!("failed to start {}", spec.name()))?;

        tracing::info!(
            "started {} (pid: {:?}) on {}",
            spec.name(),
            child.id(),
            self.address(spec.device_type, spec.device_id)
        );
        children.insert(key, child);

        Ok(())
    }

    async fn stop(&self, device_type: DeviceType, device_id: Id) -> Result<bool> {
        let child = self.children.lock().await.remove(&(device_type, device_id));

        match child {
            Some(mut child) => {
                child
                    .kill()
                    .await
                    .with_context(|| format!("failed to stop {}", device_name(device_type, device_id)))?;
                tracing::info!("stopped {}", device_name(device_type, device_id));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Devices run as separately managed services (e.g. one container each);
/// the registry only derives their addresses.
pub struct ExternalLauncher {
    settings: Launcher,
}

impl ExternalLauncher {
    pub fn new(settings: Launcher) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl DeviceLauncher for ExternalLauncher {
    fn address(&self, device_type: DeviceType, device_id: Id) -> String {
        address_for(&self.settings, device_type, device_id)
    }

    async fn launch(&self, spec: &DeviceSpec) -> Result<()> {
        tracing::info!(
            "{} is managed externally, expected at {}",
            spec.name(),
            self.address(spec.device_type, spec.device_id)
        );
        Ok(())
    }

    async fn stop(&self, _device_type: DeviceType, _device_id: Id) -> Result<bool> {
        Ok(false)
    }
}
