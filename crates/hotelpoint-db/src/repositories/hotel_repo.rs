//! Hotel catalog repository
//!
//! Reads for the booking core, plus the inserts the bootstrap seeder needs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hotelpoint_core::{
    models::{Hotel, Room},
    traits::HotelStore,
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of HotelStore
pub struct PgHotelRepository {
    pool: PgPool,
}

impl PgHotelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HotelStore for PgHotelRepository {
    #[instrument(skip(self))]
    async fn find_hotel(&self, id: Uuid) -> AppResult<Option<Hotel>> {
        debug!("Finding hotel by id: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, HotelRow>(
            r#"
            SELECT id, name, address, description, created_at
            FROM hotels
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding hotel {}: {}", id, e);
            AppError::Database(format!("Failed to find hotel: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_room(&self, id: Uuid) -> AppResult<Option<Room>> {
        debug!("Finding room by id: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, RoomRow>(
            r#"
            SELECT id, hotel_id, name, capacity, created_at
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding room {}: {}", id, e);
            AppError::Database(format!("Failed to find room: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_rooms_by_hotel(&self, hotel_id: Uuid) -> AppResult<Vec<Room>> {
        debug!("Finding rooms of hotel: {}", hotel_id);

        let rows = sqlx::query_as::<sqlx::Postgres, RoomRow>(
            r#"
            SELECT id, hotel_id, name, capacity, created_at
            FROM rooms
            WHERE hotel_id = $1
            ORDER BY name
            "#,
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing rooms of hotel {}: {}", hotel_id, e);
            AppError::Database(format!("Failed to fetch rooms: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_hotels(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hotels")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting hotels: {}", e);
                AppError::Database(format!("Failed to count hotels: {}", e))
            })?;

        Ok(count)
    }

    #[instrument(skip(self, hotel), fields(name = %hotel.name))]
    async fn create_hotel(&self, hotel: &Hotel) -> AppResult<Hotel> {
        let row = sqlx::query_as::<sqlx::Postgres, HotelRow>(
            r#"
            INSERT INTO hotels (id, name, address, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, address, description, created_at
            "#,
        )
        .bind(hotel.id)
        .bind(&hotel.name)
        .bind(&hotel.address)
        .bind(&hotel.description)
        .bind(hotel.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating hotel: {}", e);
            AppError::Database(format!("Failed to create hotel: {}", e))
        })?;

        info!("Hotel created: {}", row.id);
        Ok(row.into())
    }

    #[instrument(skip(self, room), fields(hotel_id = %room.hotel_id, name = %room.name))]
    async fn create_room(&self, room: &Room) -> AppResult<Room> {
        let row = sqlx::query_as::<sqlx::Postgres, RoomRow>(
            r#"
            INSERT INTO rooms (id, hotel_id, name, capacity, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, hotel_id, name, capacity, created_at
            "#,
        )
        .bind(room.id)
        .bind(room.hotel_id)
        .bind(&room.name)
        .bind(room.capacity)
        .bind(room.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating room: {}", e);
            if e.to_string().contains("foreign key") {
                AppError::HotelNotFound(room.hotel_id.to_string())
            } else {
                AppError::Database(format!("Failed to create room: {}", e))
            }
        })?;

        debug!("Room created: {}", row.id);
        Ok(row.into())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HotelRow {
    id: Uuid,
    name: String,
    address: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    hotel_id: Uuid,
    name: String,
    capacity: i32,
    created_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.id,
            hotel_id: row.hotel_id,
            name: row.name,
            capacity: row.capacity,
            created_at: row.created_at,
        }
    }
}
