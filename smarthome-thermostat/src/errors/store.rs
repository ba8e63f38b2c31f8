/// Failures talking to the Room Store. Every variant is a flavour of the
/// store being unavailable to the control loop: the tick logs it and keeps
/// running on the last known values.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Room store unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("Room {0} not found")]
    RoomNotFound(String),

    #[error("Room store rejected request with status {0}")]
    Rejected(u16),

    #[error("Invalid room store url: {0}")]
    InvalidUrl(String),

    #[error("Room store offline")]
    Offline,
}
