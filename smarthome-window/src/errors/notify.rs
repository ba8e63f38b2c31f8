#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0} rejected the update with status {1}")]
    Rejected(String, u16),

    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}
