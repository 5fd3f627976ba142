//! Per-room, per-day availability overrides

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Availability override for one room on one day
///
/// A day without a record is open. `available == false` blocks everyone.
/// A non-empty `user_ids` restricts an available day to the listed users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAvailability {
    pub id: Uuid,
    pub room_id: Uuid,
    pub date: NaiveDate,
    pub available: bool,
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomAvailability {
    pub fn new(room_id: Uuid, date: NaiveDate, available: bool, user_ids: Vec<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            room_id,
            date,
            available,
            user_ids,
            created_at: now,
            updated_at: now,
        }
    }

    /// Day closed to everyone
    pub fn is_blocked(&self) -> bool {
        !self.available
    }

    pub fn is_restricted(&self) -> bool {
        self.available && !self.user_ids.is_empty()
    }

    /// Whether `user_id` may book this day
    pub fn permits(&self, user_id: Uuid) -> bool {
        self.available && (self.user_ids.is_empty() || self.user_ids.contains(&user_id))
    }
}
