use std::sync::Arc;

use smarthome_api::models::{DeviceResponse, DeviceType, Id, RegisterDeviceRequest};

use crate::configs::{BootstrapDevice, RoomDefaults};
use crate::errors::{ApiError, DeviceError};
use crate::models::Device;
use crate::repositories::{DeviceRepository, RoomRepository};
use crate::services::{DeviceLauncher, DeviceSpec};

/// Keeps derived device ports within range.
pub const MAX_DEVICE_ID: Id = 9999;

/// A concurrent registration can slip past the duplicate check and only
/// fail on the unique key.
fn insert_error(e: sqlx::Error) -> ApiError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => DeviceError::DeviceExists.into(),
        e => e.into(),
    }
}

/// Keeps the device table and the running device instances in step.
pub struct RegistryService {
    device_repository: Arc<DeviceRepository>,
    room_repository: Arc<RoomRepository>,
    launcher: Arc<dyn DeviceLauncher>,
    rooms: RoomDefaults,
}

impl RegistryService {
    pub fn new(
        device_repository: Arc<DeviceRepository>,
        room_repository: Arc<RoomRepository>,
        launcher: Arc<dyn DeviceLauncher>,
        rooms: RoomDefaults,
    ) -> Self {
        Self {
            device_repository,
            room_repository,
            launcher,
            rooms,
        }
    }

    pub fn device_repository(&self) -> &Arc<DeviceRepository> {
        &self.device_repository
    }

    pub fn room_repository(&self) -> &Arc<RoomRepository> {
        &self.room_repository
    }

    pub fn address(&self, device_type: DeviceType, device_id: Id) -> String {
        self.launcher.address(device_type, device_id)
    }

    /// Rows with an unknown device type are skipped.
    pub fn to_response(&self, device: &Device) -> Option<DeviceResponse> {
        let device_type = device.kind()?;

        Some(DeviceResponse {
            id: device.id,
            device_id: device.device_id,
            device_type,
            room_id: device.room_id.clone(),
            address: self.address(device_type, device.device_id),
        })
    }

    pub fn to_responses(&self, devices: &[Device]) -> Vec<DeviceResponse> {
        devices.iter().filter_map(|device| self.to_response(device)).collect()
    }

    /// Looks a device up by type and id. An id that only exists under another
    /// type is reported as a type mismatch rather than as missing.
    pub async fn resolve(&self, device_type: DeviceType, device_id: Id) -> Result<Device, ApiError> {
        if let Some(device) = self.device_repository.find(device_type, device_id).await? {
            return Ok(device);
        }

        let others = self.device_repository.find_by_device_id(device_id).await?;
        if others.is_empty() {
            Err(DeviceError::DeviceNotFound.into())
        } else {
            Err(DeviceError::WrongDeviceType(device_type.as_str()).into())
        }
    }

    pub async fn register(&self, request: &RegisterDeviceRequest) -> Result<Device, ApiError> {
        let room_id = match request.room_id.as_deref().map(str::trim) {
            Some("") => return Err(DeviceError::InvalidRequest.into()),
            room_id => room_id.map(str::to_string),
        };

        if !(1..=MAX_DEVICE_ID).contains(&request.device_id) {
            return Err(DeviceError::InvalidRequest.into());
        }

        if self
            .device_repository
            .find(request.device_type, request.device_id)
            .await?
            .is_some()
        {
            return Err(DeviceError::DeviceExists.into());
        }

        let device = Device {
            id: 0,
            device_id: request.device_id,
            device_type: request.device_type.to_string(),
            room_id: room_id.clone(),
        };
        let spec = self.spec(&device).await?;

        let mut tx = self.device_repository.get_pool().begin().await?;

        if let Some(room_id) = &room_id {
            if self.room_repository.ensure(room_id, &self.rooms, &mut tx).await? {
                tracing::info!("created room {}", room_id);
            }
        }
        let id = self
            .device_repository
            .create(&device, &mut tx)
            .await
            .map_err(insert_error)?;

        // Dropping the transaction on launch failure discards the new rows.
        if let Err(e) = self.launcher.launch(&spec).await {
            tracing::error!("failed to launch {}: {:#}", spec.name(), e);
            return Err(DeviceError::LaunchFailed.into());
        }

        tx.commit().await?;

        tracing::info!("registered {} in room {:?}", spec.name(), room_id);

        Ok(Device { id, ..device })
    }

    pub async fn remove(&self, device_type: DeviceType, device_id: Id) -> Result<Device, ApiError> {
        let device = self.resolve(device_type, device_id).await?;

        let mut tx = self.device_repository.get_pool().begin().await?;
        self.device_repository.delete(device.id, &mut tx).await?;
        tx.commit().await?;

        if let Err(e) = self.launcher.stop(device_type, device_id).await {
            tracing::warn!("failed to stop {} {}: {:#}", device_type, device_id, e);
        }

        Ok(device)
    }

    /// Base urls of the thermostats placed in a room.
    pub async fn thermostat_urls(&self, room_id: &str) -> Result<Vec<String>, ApiError> {
        let devices = self.device_repository.find_by_room_id(room_id).await?;

        Ok(devices
            .iter()
            .filter(|device| device.kind() == Some(DeviceType::Thermostat))
            .map(|device| self.address(DeviceType::Thermostat, device.device_id))
            .collect())
    }

    async fn spec(&self, device: &Device) -> Result<DeviceSpec, ApiError> {
        let device_type = device.kind().ok_or(DeviceError::InvalidRequest)?;
        let mut spec = DeviceSpec::new(device_type, device.device_id, device.room_id.clone());

        if let (DeviceType::WindowContact, Some(room_id)) = (device_type, &device.room_id) {
            spec.thermostat_urls = self.thermostat_urls(room_id).await?;
        }

        Ok(spec)
    }

    /// Starts an instance for every registered device, e.g. after a restart.
    pub async fn launch_all(&self) -> Result<usize, ApiError> {
        let devices = self.device_repository.find_all().await?;
        let mut launched = 0;

        for device in devices.iter() {
            let spec = match self.spec(device).await {
                Ok(spec) => spec,
                Err(_) => {
                    tracing::warn!("skipping device row {} with unknown type {}", device.id, device.device_type);
                    continue;
                }
            };

            match self.launcher.launch(&spec).await {
                Ok(()) => launched += 1,
                Err(e) => tracing::error!("failed to launch {}: {:#}", spec.name(), e),
            }
        }

        Ok(launched)
    }

    /// Registers the configured seed devices that are not registered yet.
    pub async fn bootstrap(&self, devices: &[BootstrapDevice]) -> Result<usize, ApiError> {
        let mut registered = 0;

        for seed in devices {
            if self
                .device_repository
                .find(seed.device_type, seed.device_id)
                .await?
                .is_some()
            {
                continue;
            }

            let request = RegisterDeviceRequest {
                device_id: seed.device_id,
                device_type: seed.device_type,
                room_id: seed.room_id.clone(),
            };

            match self.register(&request).await {
                Ok(_) => registered += 1,
                Err(e) => tracing::error!(
                    "failed to bootstrap {} {}: {}",
                    seed.device_type,
                    seed.device_id,
                    e
                ),
            }
        }

        Ok(registered)
    }

    pub async fn stop_all(&self) -> Result<(), ApiError> {
        for device in self.device_repository.find_all().await? {
            if let Some(device_type) = device.kind() {
                if let Err(e) = self.launcher.stop(device_type, device.device_id).await {
                    tracing::warn!("failed to stop {} {}: {:#}", device_type, device.device_id, e);
                }
            }
        }

        Ok(())
    }
}
