//! Booking model
//!
//! A booking reserves one room of one hotel for a stay. Its point cost is
//! fixed at creation; afterwards only the status moves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting confirmation
    Pending,
    /// Points debited, room held
    #[default]
    Confirmed,
    /// Stay finished
    Completed,
    /// Released, points refunded
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Bookings in this status block the room and hold points
    pub fn is_active(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }

    /// No further user-initiated transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Transition table for administrative status changes.
    ///
    /// `cancelled -> pending | confirmed` is reactivation and must re-debit.
    /// Setting the current status again is allowed and has no effect.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        if *self == next {
            return true;
        }

        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
                | (Cancelled, Pending)
                | (Cancelled, Confirmed)
        )
    }

    /// Ledger effect of moving from `self` to `next`
    pub fn ledger_effect(&self, next: BookingStatus) -> LedgerEffect {
        match (self.is_active(), next.is_active()) {
            (false, true) => LedgerEffect::Reactivate,
            (true, false) => LedgerEffect::Refund,
            _ => LedgerEffect::None,
        }
    }
}

/// What a status transition does to the owner's balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEffect {
    None,
    Refund,
    Reactivate,
}

/// Booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotel_id: Uuid,
    pub room_id: Uuid,

    /// Start of stay, normalized to the check-in hour
    pub check_in: DateTime<Utc>,

    /// End of stay, normalized to the check-out hour
    pub check_out: DateTime<Utc>,

    /// Points charged; never changes after creation
    pub point_cost: i64,

    pub status: BookingStatus,

    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Create a new confirmed booking
    pub fn new(
        user_id: Uuid,
        hotel_id: Uuid,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        point_cost: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            hotel_id,
            room_id,
            check_in,
            check_out,
            point_cost,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        }
    }

    /// Strict half-open overlap with `[check_in, check_out)`
    pub fn overlaps(&self, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> bool {
        self.check_in < check_out && self.check_out > check_in
    }
}
