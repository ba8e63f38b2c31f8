use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    /// Room identifier
    pub room_id: String,
    /// Target temperature while the window is closed
    pub normal_temperature: f64,
    /// Target temperature while the window is open
    pub reduced_temperature: f64,
    /// Last simulated temperature
    pub current_temperature: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    /// New normal temperature
    pub normal_temperature: Option<f64>,
    /// New reduced temperature
    pub reduced_temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTemperatureRequest {
    pub value: f64,
}
