use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use smarthome_api::models::DeviceType;

use crate::errors::DeviceError;

fn label(device_type: DeviceType) -> &'static str {
    match device_type {
        DeviceType::Thermostat => "Thermostat",
        DeviceType::WindowContact => "Window contact",
    }
}

/// Forwards registry calls to running device instances.
#[derive(Clone)]
pub struct DeviceClient {
    client: Client,
}

impl DeviceClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client })
    }

    pub async fn get<T>(&self, device_type: DeviceType, address: &str, path: &str) -> Result<T, DeviceError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", address.trim_end_matches('/'), path);
        let response = self.client.get(&url).send().await;

        Self::read(device_type, &url, response).await
    }

    pub async fn post<B, T>(
        &self,
        device_type: DeviceType,
        address: &str,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, DeviceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", address.trim_end_matches('/'), path);
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }

        Self::read(device_type, &url, request.send().await).await
    }

    async fn read<T>(
        device_type: DeviceType,
        url: &str,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, DeviceError>
    where
        T: DeserializeOwned,
    {
        let unreachable = |e: reqwest::Error| {
            tracing::warn!("{} at {} not reachable: {}", label(device_type), url, e);
            DeviceError::DeviceUnreachable(label(device_type))
        };

        response
            .and_then(|response| response.error_for_status())
            .map_err(unreachable)?
            .json::<T>()
            .await
            .map_err(unreachable)
    }
}
