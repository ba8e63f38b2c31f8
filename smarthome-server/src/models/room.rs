use serde::{Deserialize, Serialize};
use smarthome_api::models::RoomResponse;

use crate::models::Table;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Room {
    pub id: i32,
    pub room_id: String,
    // Target while the window is closed, shown as "normal temperature".
    pub room_temperature: f64,
    pub reduced_temperature: f64,
    pub current_temperature: f64,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            room_id: room.room_id,
            normal_temperature: room.room_temperature,
            reduced_temperature: room.reduced_temperature,
            current_temperature: room.current_temperature,
        }
    }
}

#[derive(Clone)]
pub struct RoomTable;

impl Table for RoomTable {
    fn name(&self) -> &'static str {
        "rooms"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS rooms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                room_id TEXT NOT NULL UNIQUE,
                room_temperature REAL NOT NULL DEFAULT 22,
                reduced_temperature REAL NOT NULL DEFAULT 18,
                current_temperature REAL NOT NULL DEFAULT 20
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS rooms;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
