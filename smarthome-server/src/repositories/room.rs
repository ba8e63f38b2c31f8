use std::sync::Arc;

use sqlx::{Error, SqlitePool, Sqlite, Transaction};

use crate::configs::{RoomDefaults, Storage};
use crate::models::Room;

pub struct RoomRepository {
    storage: Arc<Storage>,
}

impl RoomRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl RoomRepository {
    pub async fn create(
        &self,
        item: &Room,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO rooms (room_id, room_temperature, reduced_temperature, current_temperature)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&item.room_id)
        .bind(item.room_temperature)
        .bind(item.reduced_temperature)
        .bind(item.current_temperature)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    /// Creates the room with default values unless it already exists.
    /// Returns whether a row was inserted.
    pub async fn ensure(
        &self,
        room_id: &str,
        defaults: &RoomDefaults,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<bool, Error> {
        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO rooms (room_id, room_temperature, reduced_temperature, current_temperature)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(room_id)
        .bind(defaults.room_temperature)
        .bind(defaults.reduced_temperature)
        .bind(defaults.current_temperature)
        .execute(&mut **transaction)
        .await?
        .rows_affected();

        Ok(inserted > 0)
    }

    pub async fn find_all(&self) -> Result<Vec<Room>, Error> {
        let rooms: Vec<Room> = sqlx::query_as("SELECT * FROM rooms ORDER BY room_id")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(rooms)
    }

    pub async fn find_by_room_id(&self, room_id: &str) -> Result<Option<Room>, Error> {
        let room: Option<Room> = sqlx::query_as("SELECT * FROM rooms WHERE room_id = $1")
            .bind(room_id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(room)
    }

    pub async fn update_setpoints(
        &self,
        room_id: &str,
        room_temperature: f64,
        reduced_temperature: f64,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<bool, Error> {
        let updated = sqlx::query(
            r#"
            UPDATE rooms
            SET room_temperature = $1, reduced_temperature = $2
            WHERE room_id = $3
            "#,
        )
        .bind(room_temperature)
        .bind(reduced_temperature)
        .bind(room_id)
        .execute(&mut **transaction)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    pub async fn update_current_temperature(
        &self,
        room_id: &str,
        current_temperature: f64,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<bool, Error> {
        let updated = sqlx::query("UPDATE rooms SET current_temperature = $1 WHERE room_id = $2")
            .bind(current_temperature)
            .bind(room_id)
            .execute(&mut **transaction)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }
}
