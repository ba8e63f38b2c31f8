use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handles::*;
use crate::services::WindowContact;

pub fn create_app(window: Arc<WindowContact>) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/open", post(open_window))
        .route("/close", post(close_window))
        .route("/toggle", post(toggle_window))
        .with_state(WindowState { window })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
