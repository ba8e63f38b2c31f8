use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Invalid room temperature")]
    InvalidTemperature,

    #[error("Invalid request parameters")]
    InvalidRequest,
}

impl RoomError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RoomError::RoomNotFound => StatusCode::NOT_FOUND,
            RoomError::InvalidTemperature => StatusCode::BAD_REQUEST,
            RoomError::InvalidRequest => StatusCode::BAD_REQUEST,
        }
    }
}
