use serde::{Deserialize, Serialize};

use super::WindowStatus;

/// Live state of one thermostat instance, as served by `/status` and pushed
/// over `/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatSnapshot {
    pub thermostat_id: String,
    pub room_id: String,
    pub current_temperature: f64,
    pub room_temperature: f64,
    pub reduced_temperature: f64,
    /// Heating intensity level in `0..=5`
    pub heating_mode: u8,
    pub window_status: WindowStatus,
}

/// Manual override body. Every field is optional; unknown fields are ignored.
///
/// `window` stays a plain string so that an unrecognized value degrades to a
/// no-op instead of rejecting the whole request.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatUpdateRequest {
    #[serde(rename = "currentTemp", default, skip_serializing_if = "Option::is_none")]
    pub current_temp: Option<f64>,
    #[serde(rename = "roomTemp", default, skip_serializing_if = "Option::is_none")]
    pub room_temp: Option<f64>,
    #[serde(rename = "reducedTemp", default, skip_serializing_if = "Option::is_none")]
    pub reduced_temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
}

impl ThermostatUpdateRequest {
    pub fn window(status: WindowStatus) -> Self {
        Self {
            window: Some(status.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatUpdateResponse {
    #[serde(flatten)]
    pub snapshot: ThermostatSnapshot,
    pub message: String,
}
