use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use smarthome_api::models::{CurrentTemperatureRequest, DeviceResponse, RoomResponse, UpdateRoomRequest};

use crate::errors::{ApiError, RoomError};
use crate::models::Room;
use crate::services::RegistryService;

#[derive(Clone)]
pub struct RoomState {
    pub registry: Arc<RegistryService>,
}

pub fn room_router(room_state: RoomState) -> Router {
    Router::new()
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/:room_id", get(get_room).put(update_room))
        .route(
            "/api/rooms/:room_id/current-temperature",
            put(update_current_temperature),
        )
        .route("/api/rooms/:room_id/devices", get(get_room_devices))
        .with_state(room_state)
}

fn check_temperature(value: f64) -> Result<f64, RoomError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RoomError::InvalidTemperature)
    }
}

async fn find_room(state: &RoomState, room_id: &str) -> Result<Room, ApiError> {
    Ok(state
        .registry
        .room_repository()
        .find_by_room_id(room_id)
        .await?
        .ok_or(RoomError::RoomNotFound)?)
}

pub async fn get_rooms(State(state): State<RoomState>) -> Result<Json<Vec<RoomResponse>>, ApiError> {
    let rooms = state.registry.room_repository().find_all().await?;

    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

pub async fn get_room(
    State(state): State<RoomState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, ApiError> {
    Ok(Json(find_room(&state, &room_id).await?.into()))
}

/// Fields left out of the body keep their stored value.
pub async fn update_room(
    State(state): State<RoomState>,
    Path(room_id): Path<String>,
    body: Result<Json<UpdateRoomRequest>, JsonRejection>,
) -> Result<Json<RoomResponse>, ApiError> {
    let Json(body) = body.map_err(|_| RoomError::InvalidRequest)?;
    let room = find_room(&state, &room_id).await?;

    let room_temperature = check_temperature(body.normal_temperature.unwrap_or(room.room_temperature))?;
    let reduced_temperature =
        check_temperature(body.reduced_temperature.unwrap_or(room.reduced_temperature))?;

    let repository = state.registry.room_repository();
    let mut tx = repository.get_pool().begin().await?;
    repository
        .update_setpoints(&room_id, room_temperature, reduced_temperature, &mut tx)
        .await?;
    tx.commit().await?;

    tracing::debug!(
        "room {} setpoints: normal {}, reduced {}",
        room_id,
        room_temperature,
        reduced_temperature
    );

    Ok(Json(
        Room {
            room_temperature,
            reduced_temperature,
            ..room
        }
        .into(),
    ))
}

pub async fn update_current_temperature(
    State(state): State<RoomState>,
    Path(room_id): Path<String>,
    body: Result<Json<CurrentTemperatureRequest>, JsonRejection>,
) -> Result<Json<RoomResponse>, ApiError> {
    let Json(body) = body.map_err(|_| RoomError::InvalidRequest)?;
    let current_temperature = check_temperature(body.value)?;

    let repository = state.registry.room_repository();
    let mut tx = repository.get_pool().begin().await?;
    let updated = repository
        .update_current_temperature(&room_id, current_temperature, &mut tx)
        .await?;
    tx.commit().await?;

    if !updated {
        return Err(RoomError::RoomNotFound.into());
    }

    Ok(Json(find_room(&state, &room_id).await?.into()))
}

pub async fn get_room_devices(
    State(state): State<RoomState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    find_room(&state, &room_id).await?;

    let devices = state
        .registry
        .device_repository()
        .find_by_room_id(&room_id)
        .await?;

    Ok(Json(state.registry.to_responses(&devices)))
}
