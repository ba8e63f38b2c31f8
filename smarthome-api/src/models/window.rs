use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowStatus {
    Open,
    #[default]
    #[serde(alias = "close")]
    Closed,
}

impl WindowStatus {
    pub fn toggled(self) -> Self {
        match self {
            WindowStatus::Open => WindowStatus::Closed,
            WindowStatus::Closed => WindowStatus::Open,
        }
    }

    pub fn is_open(self) -> bool {
        self == WindowStatus::Open
    }
}

impl fmt::Display for WindowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowStatus::Open => write!(f, "open"),
            WindowStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for WindowStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(WindowStatus::Open),
            "closed" | "close" => Ok(WindowStatus::Closed),
            other => Err(format!("unknown window status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowContactStatus {
    /// Window contact identifier
    pub window_contact_id: String,
    /// Room the contact is mounted in
    pub room_id: String,
    /// Current window state
    pub mode: WindowStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowCommandResponse {
    /// Human readable confirmation
    pub message: String,
    /// Window state after the command
    pub mode: WindowStatus,
}
