use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device not found")]
    DeviceNotFound,

    #[error("Device already registered")]
    DeviceExists,

    #[error("Device is not a {0}")]
    WrongDeviceType(&'static str),

    #[error("Invalid request parameters")]
    InvalidRequest,

    #[error("Device could not be started")]
    LaunchFailed,

    #[error("{0} not reachable")]
    DeviceUnreachable(&'static str),
}

impl DeviceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeviceError::DeviceNotFound => StatusCode::NOT_FOUND,
            DeviceError::DeviceExists => StatusCode::CONFLICT,
            DeviceError::WrongDeviceType(_) => StatusCode::BAD_REQUEST,
            DeviceError::InvalidRequest => StatusCode::BAD_REQUEST,
            DeviceError::LaunchFailed => StatusCode::INTERNAL_SERVER_ERROR,
            DeviceError::DeviceUnreachable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
