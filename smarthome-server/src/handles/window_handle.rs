use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use smarthome_api::models::{DeviceResponse, DeviceType, Id, WindowCommandResponse, WindowContactStatus};

use crate::errors::ApiError;
use crate::services::{DeviceClient, RegistryService};

#[derive(Clone)]
pub struct WindowContactState {
    pub registry: Arc<RegistryService>,
    pub client: DeviceClient,
}

pub fn window_contact_router(window_contact_state: WindowContactState) -> Router {
    Router::new()
        .route("/api/window-contacts", get(get_window_contacts))
        .route("/api/window-contacts/:device_id/status", get(get_window_contact_status))
        .route("/api/window-contacts/:device_id/open", post(open_window))
        .route("/api/window-contacts/:device_id/closed", post(close_window))
        .route("/api/window-contacts/:device_id/toggle", post(toggle_window))
        .with_state(window_contact_state)
}

pub async fn get_window_contacts(
    State(state): State<WindowContactState>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    let devices = state
        .registry
        .device_repository()
        .find_by_type(DeviceType::WindowContact)
        .await?;

    Ok(Json(state.registry.to_responses(&devices)))
}

pub async fn get_window_contact_status(
    State(state): State<WindowContactState>,
    Path(device_id): Path<Id>,
) -> Result<Json<WindowContactStatus>, ApiError> {
    let device = state.registry.resolve(DeviceType::WindowContact, device_id).await?;
    let address = state.registry.address(DeviceType::WindowContact, device.device_id);

    let status = state
        .client
        .get(DeviceType::WindowContact, &address, "status")
        .await?;

    Ok(Json(status))
}

async fn send_command(
    state: &WindowContactState,
    device_id: Id,
    command: &str,
) -> Result<Json<WindowCommandResponse>, ApiError> {
    let device = state.registry.resolve(DeviceType::WindowContact, device_id).await?;
    let address = state.registry.address(DeviceType::WindowContact, device.device_id);

    let response = state
        .client
        .post::<(), _>(DeviceType::WindowContact, &address, command, None)
        .await?;

    Ok(Json(response))
}

pub async fn open_window(
    State(state): State<WindowContactState>,
    Path(device_id): Path<Id>,
) -> Result<Json<WindowCommandResponse>, ApiError> {
    send_command(&state, device_id, "open").await
}

pub async fn close_window(
    State(state): State<WindowContactState>,
    Path(device_id): Path<Id>,
) -> Result<Json<WindowCommandResponse>, ApiError> {
    send_command(&state, device_id, "close").await
}

pub async fn toggle_window(
    State(state): State<WindowContactState>,
    Path(device_id): Path<Id>,
) -> Result<Json<WindowCommandResponse>, ApiError> {
    send_command(&state, device_id, "toggle").await
}
