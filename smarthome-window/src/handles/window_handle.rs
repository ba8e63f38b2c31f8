use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use smarthome_api::models::{WindowCommandResponse, WindowContactStatus, WindowStatus};

use crate::services::WindowContact;

#[derive(Clone)]
pub struct WindowState {
    pub window: Arc<WindowContact>,
}

fn command_response(mode: WindowStatus) -> Json<WindowCommandResponse> {
    let message = match mode {
        WindowStatus::Open => "Window opened",
        WindowStatus::Closed => "Window closed",
    };

    Json(WindowCommandResponse {
        message: message.to_string(),
        mode,
    })
}

pub async fn get_status(State(state): State<WindowState>) -> Json<WindowContactStatus> {
    Json(state.window.status().await)
}

pub async fn open_window(State(state): State<WindowState>) -> Json<WindowCommandResponse> {
    command_response(state.window.set(WindowStatus::Open).await)
}

pub async fn close_window(State(state): State<WindowState>) -> Json<WindowCommandResponse> {
    command_response(state.window.set(WindowStatus::Closed).await)
}

pub async fn toggle_window(State(state): State<WindowState>) -> Json<WindowCommandResponse> {
    command_response(state.window.toggle().await)
}
