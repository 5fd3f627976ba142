//! Booking repository implementation
//!
//! Overlap queries use strict half-open comparison so a stay ending on the
//! day another begins does not conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hotelpoint_core::{
    models::{Booking, BookingStatus},
    traits::BookingStore,
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

const BOOKING_COLUMNS: &str =
    "id, user_id, hotel_id, room_id, check_in, check_out, point_cost, status, created_at";

/// PostgreSQL implementation of BookingStore
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn parse_status(s: &str) -> BookingStatus {
        BookingStatus::from_str(s).unwrap_or_else(|| {
            warn!("Unknown booking status in database: {}", s);
            BookingStatus::Pending
        })
    }
}

#[async_trait]
impl BookingStore for PgBookingRepository {
    #[instrument(skip(self, booking), fields(booking_id = %booking.id))]
    async fn create(&self, booking: &Booking) -> AppResult<Booking> {
        debug!(
            "Creating booking for user {} room {}",
            booking.user_id, booking.room_id
        );

        let query = format!(
            r#"
            INSERT INTO bookings (
                id, user_id, hotel_id, room_id, check_in, check_out,
                point_cost, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&query)
            .bind(booking.id)
            .bind(booking.user_id)
            .bind(booking.hotel_id)
            .bind(booking.room_id)
            .bind(booking.check_in)
            .bind(booking.check_out)
            .bind(booking.point_cost)
            .bind(booking.status.to_string())
            .bind(booking.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating booking: {}", e);
                AppError::Database(format!("Failed to create booking: {}", e))
            })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let query = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding booking {}: {}", id, e);
                AppError::Database(format!("Failed to find booking: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        debug!("Finding bookings of user: {}", user_id);

        let query = format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding bookings of user {}: {}", user_id, e);
                AppError::Database(format!("Failed to fetch bookings: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        debug!("Finding active bookings of user: {}", user_id);

        let query = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE user_id = $1
              AND status NOT IN ('cancelled', 'completed')
              AND check_out > $2
            ORDER BY check_in
            "#,
            BOOKING_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    "Database error finding active bookings of user {}: {}",
                    user_id, e
                );
                AppError::Database(format!("Failed to fetch bookings: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_overlapping_active(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let query = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE room_id = $1
              AND status <> 'cancelled'
              AND check_in < $3
              AND check_out > $2
            ORDER BY check_in
            "#,
            BOOKING_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&query)
            .bind(room_id)
            .bind(check_in)
            .bind(check_out)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    "Database error finding overlapping bookings for room {}: {}",
                    room_id, e
                );
                AppError::Database(format!("Failed to check room bookings: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count_overlapping_active(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE room_id = $1
              AND status <> 'cancelled'
              AND check_in < $3
              AND check_out > $2
            "#,
        )
        .bind(room_id)
        .bind(check_in)
        .bind(check_out)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error counting overlapping bookings for room {}: {}",
                room_id, e
            );
            AppError::Database(format!("Failed to check room bookings: {}", e))
        })?;

        debug!("Room {} has {} overlapping bookings", room_id, result.0);
        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Booking> {
        debug!("Setting booking {} status to {}", id, status);

        let query = format!(
            "UPDATE bookings SET status = $2 WHERE id = $1 RETURNING {}",
            BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&query)
            .bind(id)
            .bind(status.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating booking {}: {}", id, e);
                AppError::Database(format!("Failed to update booking status: {}", e))
            })?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting booking: {}", id);

        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting booking {}: {}", id, e);
                AppError::Database(format!("Failed to delete booking: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Booking>, i64)> {
        let status = status.map(|s| s.to_string());

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(&status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting bookings: {}", e);
            AppError::Database(format!("Failed to count bookings: {}", e))
        })?;

        let query = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            BOOKING_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&query)
            .bind(&status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing bookings: {}", e);
                AppError::Database(format!("Failed to fetch bookings: {}", e))
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    hotel_id: Uuid,
    room_id: Uuid,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    point_cost: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            hotel_id: row.hotel_id,
            room_id: row.room_id,
            check_in: row.check_in,
            check_out: row.check_out,
            point_cost: row.point_cost,
            status: PgBookingRepository::parse_status(&row.status),
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(
            PgBookingRepository::parse_status("cancelled"),
            BookingStatus::Cancelled
        );
        assert_eq!(
            PgBookingRepository::parse_status("garbage"),
            BookingStatus::Pending
        );
    }
}
