use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handles::*;
use crate::services::{DeviceClient, RegistryService};

pub fn create_app(registry: Arc<RegistryService>, client: DeviceClient) -> Router {
    let devices = device_router(DeviceState {
        registry: registry.clone(),
    });

    let rooms = room_router(RoomState {
        registry: registry.clone(),
    });

    let thermostats = thermostat_router(ThermostatState {
        registry: registry.clone(),
        client: client.clone(),
    });

    let window_contacts = window_contact_router(WindowContactState {
        registry: registry.clone(),
        client: client.clone(),
    });

    Router::new()
        .merge(devices)
        .merge(rooms)
        .merge(thermostats)
        .merge(window_contacts)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
