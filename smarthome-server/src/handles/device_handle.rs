use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use smarthome_api::models::{DeviceResponse, DeviceType, Id, RegisterDeviceRequest};

use crate::errors::{ApiError, DeviceError};
use crate::services::RegistryService;

#[derive(Clone)]
pub struct DeviceState {
    pub registry: Arc<RegistryService>,
}

pub fn device_router(device_state: DeviceState) -> Router {
    Router::new()
        .route("/api/devices", get(get_devices).post(register_device))
        .route(
            "/api/devices/:device_type/:device_id",
            get(get_device).delete(delete_device),
        )
        .with_state(device_state)
}

fn parse_device_type(value: &str) -> Result<DeviceType, DeviceError> {
    value.parse().map_err(|_| DeviceError::InvalidRequest)
}

pub async fn register_device(
    State(state): State<DeviceState>,
    body: Result<Json<RegisterDeviceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DeviceResponse>), ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!("rejected device registration: {}", e);
        DeviceError::InvalidRequest
    })?;

    let device = state.registry.register(&body).await?;
    let response = state
        .registry
        .to_response(&device)
        .ok_or(DeviceError::InvalidRequest)?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_devices(State(state): State<DeviceState>) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    let devices = state.registry.device_repository().find_all().await?;

    Ok(Json(state.registry.to_responses(&devices)))
}

pub async fn get_device(
    State(state): State<DeviceState>,
    Path((device_type, device_id)): Path<(String, Id)>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let device_type = parse_device_type(&device_type)?;

    let device = state
        .registry
        .device_repository()
        .find(device_type, device_id)
        .await?
        .ok_or(DeviceError::DeviceNotFound)?;

    Ok(Json(
        state
            .registry
            .to_response(&device)
            .ok_or(DeviceError::DeviceNotFound)?,
    ))
}

pub async fn delete_device(
    State(state): State<DeviceState>,
    Path((device_type, device_id)): Path<(String, Id)>,
) -> Result<StatusCode, ApiError> {
    let device_type = parse_device_type(&device_type)?;

    state.registry.remove(device_type, device_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
