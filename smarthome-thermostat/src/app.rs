use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handles::*;
use crate::services::Thermostat;

pub fn create_app(thermostat: Arc<Thermostat>) -> Router {
    let sse = Router::new()
        .route("/", get(sse_handler))
        .with_state(SSEState {
            observers: thermostat.observers().clone(),
        });

    Router::new()
        .route("/status", get(get_status))
        .route("/update", post(update_thermostat))
        .with_state(ThermostatState { thermostat })
        .nest("/events", sse)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
