//! Room availability DTOs

use chrono::{DateTime, NaiveDate, Utc};
use hotelpoint_core::models::RoomAvailability;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Apply one override to every day in `[from_date, to_date]`
#[derive(Debug, Clone, Deserialize)]
pub struct RoomAvailabilityRequest {
    pub room_id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,

    #[serde(default = "default_available")]
    pub available: bool,

    /// Empty means any user may book
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub date: NaiveDate,
    pub available: bool,
    pub user_ids: Vec<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoomAvailability> for AvailabilityResponse {
    fn from(record: RoomAvailability) -> Self {
        Self {
            id: record.id,
            room_id: record.room_id,
            date: record.date,
            available: record.available,
            user_ids: record.user_ids,
            updated_at: record.updated_at,
        }
    }
}
