use serde::{Deserialize, Serialize};
use smarthome_api::models::DeviceType;

use crate::models::Table;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i32,
    pub device_id: i32,
    pub device_type: String,
    pub room_id: Option<String>,
}

impl Device {
    pub fn kind(&self) -> Option<DeviceType> {
        self.device_type.parse().ok()
    }
}

#[derive(Clone)]
pub struct DeviceTable;

impl Table for DeviceTable {
    fn name(&self) -> &'static str {
        "devices"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id INTEGER NOT NULL,
                device_type TEXT NOT NULL,
                room_id TEXT,
                UNIQUE (device_id, device_type),
                FOREIGN KEY (room_id) REFERENCES rooms (room_id) ON DELETE SET NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS devices;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["rooms"]
    }
}
