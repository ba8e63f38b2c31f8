use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use smarthome_api::models::{
    DeviceResponse, DeviceType, Id, ThermostatSnapshot, ThermostatUpdateRequest, ThermostatUpdateResponse,
};

use crate::errors::{ApiError, DeviceError};
use crate::services::{DeviceClient, RegistryService};

#[derive(Clone)]
pub struct ThermostatState {
    pub registry: Arc<RegistryService>,
    pub client: DeviceClient,
}

pub fn thermostat_router(thermostat_state: ThermostatState) -> Router {
    Router::new()
        .route("/api/thermostats", get(get_thermostats))
        .route("/api/thermostats/:device_id/status", get(get_thermostat_status))
        .route("/api/thermostats/:device_id/update", post(update_thermostat))
        .with_state(thermostat_state)
}

pub async fn get_thermostats(
    State(state): State<ThermostatState>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    let devices = state
        .registry
        .device_repository()
        .find_by_type(DeviceType::Thermostat)
        .await?;

    Ok(Json(state.registry.to_responses(&devices)))
}

pub async fn get_thermostat_status(
    State(state): State<ThermostatState>,
    Path(device_id): Path<Id>,
) -> Result<Json<ThermostatSnapshot>, ApiError> {
    let device = state.registry.resolve(DeviceType::Thermostat, device_id).await?;
    let address = state.registry.address(DeviceType::Thermostat, device.device_id);

    let snapshot = state
        .client
        .get(DeviceType::Thermostat, &address, "status")
        .await?;

    Ok(Json(snapshot))
}

/// Relays a manual override to the thermostat instance.
pub async fn update_thermostat(
    State(state): State<ThermostatState>,
    Path(device_id): Path<Id>,
    body: Result<Json<ThermostatUpdateRequest>, JsonRejection>,
) -> Result<Json<ThermostatUpdateResponse>, ApiError> {
    let Json(body) = body.map_err(|_| DeviceError::InvalidRequest)?;

    let device = state.registry.resolve(DeviceType::Thermostat, device_id).await?;
    let address = state.registry.address(DeviceType::Thermostat, device.device_id);

    let response = state
        .client
        .post(DeviceType::Thermostat, &address, "update", Some(&body))
        .await?;

    Ok(Json(response))
}
