use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Simulated heating thermostat
    Thermostat,
    /// Simulated window open/closed contact
    #[serde(alias = "fensterkontakt")]
    WindowContact,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Thermostat => "thermostat",
            DeviceType::WindowContact => "window_contact",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "thermostat" => Ok(DeviceType::Thermostat),
            "window_contact" | "fensterkontakt" => Ok(DeviceType::WindowContact),
            other => Err(format!("unknown device type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    /// Numeric identifier, unique per device type
    pub device_id: Id,
    /// Device category
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Room the device is placed in
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    /// Internal row identifier
    pub id: Id,
    /// Numeric identifier, unique per device type
    pub device_id: Id,
    /// Device category
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Room the device is placed in
    pub room_id: Option<String>,
    /// Base URL of the running device instance
    pub address: String,
}
