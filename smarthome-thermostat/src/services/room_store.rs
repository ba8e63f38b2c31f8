use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use smarthome_api::models::{CurrentTemperatureRequest, RoomResponse, UpdateRoomRequest};

use crate::errors::StoreError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomSetpoints {
    pub normal_temperature: f64,
    pub reduced_temperature: f64,
    pub current_temperature: f64,
}

impl From<RoomResponse> for RoomSetpoints {
    fn from(room: RoomResponse) -> Self {
        Self {
            normal_temperature: room.normal_temperature,
            reduced_temperature: room.reduced_temperature,
            current_temperature: room.current_temperature,
        }
    }
}

/// Per-room setpoints and temperature, owned by the registry.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn fetch_setpoints(&self, room_id: &str) -> Result<RoomSetpoints, StoreError>;

    async fn write_current_temperature(&self, room_id: &str, value: f64) -> Result<(), StoreError>;

    async fn write_setpoints(
        &self,
        room_id: &str,
        normal_temperature: f64,
        reduced_temperature: f64,
    ) -> Result<(), StoreError>;
}

/// Room store backed by the registry's REST API.
pub struct HttpRoomStore {
    client: Client,
    base_url: Url,
}

impl HttpRoomStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    fn room_url(&self, room_id: &str, suffix: Option<&str>) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend(["api", "rooms", room_id]);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }

        Ok(url)
    }

    fn check(room_id: &str, status: StatusCode) -> Result<(), StoreError> {
        match status {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::RoomNotFound(room_id.to_string())),
            status => Err(StoreError::Rejected(status.as_u16())),
        }
    }
}

#[async_trait]
impl RoomStore for HttpRoomStore {
    async fn fetch_setpoints(&self, room_id: &str) -> Result<RoomSetpoints, StoreError> {
        let response = self.client.get(self.room_url(room_id, None)?).send().await?;
        Self::check(room_id, response.status())?;

        let room: RoomResponse = response.json().await?;

        Ok(room.into())
    }

    async fn write_current_temperature(&self, room_id: &str, value: f64) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.room_url(room_id, Some("current-temperature"))?)
            .json(&CurrentTemperatureRequest { value })
            .send()
            .await?;

        Self::check(room_id, response.status())
    }

    async fn write_setpoints(
        &self,
        room_id: &str,
        normal_temperature: f64,
        reduced_temperature: f64,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.room_url(room_id, None)?)
            .json(&UpdateRoomRequest {
                normal_temperature: Some(normal_temperature),
                reduced_temperature: Some(reduced_temperature),
            })
            .send()
            .await?;

        Self::check(room_id, response.status())
    }
}

/// In-process room store, used when the thermostat runs without a registry.
/// Can be switched offline to simulate an unreachable store.
#[derive(Default)]
pub struct MemoryRoomStore {
    rooms: Mutex<HashMap<String, RoomSetpoints>>,
    offline: AtomicBool,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_room(self, room_id: &str, setpoints: RoomSetpoints) -> Self {
        self.insert(room_id, setpoints);
        self
    }

    pub fn insert(&self, room_id: &str, setpoints: RoomSetpoints) {
        self.rooms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(room_id.to_string(), setpoints);
    }

    pub fn get(&self, room_id: &str) -> Option<RoomSetpoints> {
        self.rooms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(room_id)
            .copied()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Offline)
        } else {
            Ok(())
        }
    }

    fn modify<F>(&self, room_id: &str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut RoomSetpoints),
    {
        self.ensure_online()?;

        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| StoreError::RoomNotFound(room_id.to_string()))?;
        f(room);

        Ok(())
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn fetch_setpoints(&self, room_id: &str) -> Result<RoomSetpoints, StoreError> {
        self.ensure_online()?;

        self.get(room_id)
            .ok_or_else(|| StoreError::RoomNotFound(room_id.to_string()))
    }

    async fn write_current_temperature(&self, room_id: &str, value: f64) -> Result<(), StoreError> {
        self.modify(room_id, |room| room.current_temperature = value)
    }

    async fn write_setpoints(
        &self,
        room_id: &str,
        normal_temperature: f64,
        reduced_temperature: f64,
    ) -> Result<(), StoreError> {
        self.modify(room_id, |room| {
            room.normal_temperature = normal_temperature;
            room.reduced_temperature = reduced_temperature;
        })
    }
}
