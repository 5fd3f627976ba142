//! Room availability override repository
//!
//! No uniqueness is enforced on (room_id, date); `find_override_for_date`
//! returns the oldest record when duplicates exist.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hotelpoint_core::{models::RoomAvailability, traits::AvailabilityStore, AppError, AppResult};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of AvailabilityStore
pub struct PgAvailabilityRepository {
    pool: PgPool,
}

impl PgAvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityStore for PgAvailabilityRepository {
    #[instrument(skip(self))]
    async fn find_overrides_in_range(
        &self,
        room_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<RoomAvailability>> {
        debug!(
            "Finding availability of room {} between {} and {}",
            room_id, start, end
        );

        let rows = sqlx::query_as::<sqlx::Postgres, AvailabilityRow>(
            r#"
            SELECT id, room_id, date, available, user_ids, created_at, updated_at
            FROM room_availability
            WHERE room_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date, created_at
            "#,
        )
        .bind(room_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding availability of room {}: {}", room_id, e);
            AppError::Database(format!("Failed to fetch room availability: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_override_for_date(
        &self,
        room_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<RoomAvailability>> {
        let row = sqlx::query_as::<sqlx::Postgres, AvailabilityRow>(
            r#"
            SELECT id, room_id, date, available, user_ids, created_at, updated_at
            FROM room_availability
            WHERE room_id = $1 AND date = $2
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(room_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error finding availability of room {} on {}: {}",
                room_id, date, e
            );
            AppError::Database(format!("Failed to find room availability: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, record), fields(room_id = %record.room_id, date = %record.date))]
    async fn insert_override(&self, record: &RoomAvailability) -> AppResult<RoomAvailability> {
        let row = sqlx::query_as::<sqlx::Postgres, AvailabilityRow>(
            r#"
            INSERT INTO room_availability (id, room_id, date, available, user_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, room_id, date, available, user_ids, created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(record.room_id)
        .bind(record.date)
        .bind(record.available)
        .bind(&record.user_ids)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error inserting room availability: {}", e);
            AppError::Database(format!("Failed to create room availability: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, record), fields(record_id = %record.id))]
    async fn update_override(&self, record: &RoomAvailability) -> AppResult<RoomAvailability> {
        let row = sqlx::query_as::<sqlx::Postgres, AvailabilityRow>(
            r#"
            UPDATE room_availability
            SET available = $2,
                user_ids = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, room_id, date, available, user_ids, created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(record.available)
        .bind(&record.user_ids)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating room availability {}: {}", record.id, e);
            AppError::Database(format!("Failed to update room availability: {}", e))
        })?
        .ok_or_else(|| {
            AppError::Conflict(format!("availability record {} was removed", record.id))
        })?;

        Ok(row.into())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AvailabilityRow {
    id: Uuid,
    room_id: Uuid,
    date: NaiveDate,
    available: bool,
    user_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AvailabilityRow> for RoomAvailability {
    fn from(row: AvailabilityRow) -> Self {
        Self {
            id: row.id,
            room_id: row.room_id,
            date: row.date,
            available: row.available,
            user_ids: row.user_ids,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
