use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, StatusCode, Url};
use smarthome_api::models::{DeviceResponse, DeviceType, ThermostatUpdateRequest, WindowStatus};

use crate::errors::NotifyError;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Pushes the window mode to the thermostats of the room and returns how
    /// many accepted it. Failures are logged, never returned.
    async fn notify(&self, status: WindowStatus) -> usize;
}

/// Posts window changes to each thermostat's override endpoint.
pub struct HttpNotifier {
    client: Client,
    room_id: String,
    thermostat_urls: Vec<String>,
    registry_url: Option<Url>,
}

impl HttpNotifier {
    pub fn new(
        room_id: &str,
        thermostat_urls: Vec<String>,
        registry_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let registry_url = registry_url
            .map(|url| Url::parse(url).map_err(|e| NotifyError::InvalidUrl(format!("{url}: {e}"))))
            .transpose()?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            room_id: room_id.to_string(),
            thermostat_urls,
            registry_url,
        })
    }

    fn room_devices_url(&self, registry_url: &Url) -> Result<Url, NotifyError> {
        let mut url = registry_url.clone();
        url.path_segments_mut()
            .map_err(|_| NotifyError::InvalidUrl(registry_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "rooms", self.room_id.as_str(), "devices"]);

        Ok(url)
    }

    async fn lookup(&self, registry_url: &Url) -> Result<Vec<String>, NotifyError> {
        let url = self.room_devices_url(registry_url)?;
        let response = self.client.get(url.clone()).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(NotifyError::Rejected(url.to_string(), response.status().as_u16()));
        }

        let devices: Vec<DeviceResponse> = response.json().await?;

        Ok(devices
            .into_iter()
            .filter(|device| device.device_type == DeviceType::Thermostat)
            .map(|device| device.address)
            .collect())
    }

    /// Configured thermostats plus the ones the registry knows for the room.
    pub async fn targets(&self) -> Vec<String> {
        let mut targets = self.thermostat_urls.clone();

        if let Some(registry_url) = &self.registry_url {
            match self.lookup(registry_url).await {
                Ok(urls) => targets.extend(urls),
                Err(e) => tracing::warn!("thermostat lookup for room {} failed: {}", self.room_id, e),
            }
        }

        let mut seen = Vec::with_capacity(targets.len());
        targets.retain(|url| {
            let key = url.trim_end_matches('/').to_string();
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });

        targets
    }

    async fn send(&self, thermostat_url: &str, status: WindowStatus) -> Result<(), NotifyError> {
        let url = format!("{}/update", thermostat_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&ThermostatUpdateRequest::window(status))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(url, response.status().as_u16()))
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, status: WindowStatus) -> usize {
        let targets = self.targets().await;

        let results = join_all(targets.iter().map(|url| async move { (url, self.send(url, status).await) })).await;

        results
            .into_iter()
            .filter(|(url, result)| match result {
                Ok(()) => {
                    tracing::debug!("notified {} of window {}", url, status);
                    true
                }
                Err(e) => {
                    tracing::warn!("failed to notify {}: {}", url, e);
                    false
                }
            })
            .count()
    }
}
