//! Booking core for HotelPoint
//!
//! Prices stays from the date-rule calendar, checks room availability and
//! couples the booking lifecycle with each user's point ledger.
//!
//! # Services
//!
//! - `DateRuleCalendar` - per-night cost with weekend and holiday rules
//! - `AvailabilityChecker` - booking overlap plus per-day room overrides
//! - `PointLedger` - balance changes paired with transaction records
//! - `BookingEngine` - create, cancel, admin status changes and deletion
//! - `IdentityService` - registration with the initial grant, and login
//! - `Seeder` - idempotent sample catalog, holidays and admin account
//!
//! Services hold `Arc<dyn ...>` store handles and are cheap to clone.

pub mod availability;
pub mod booking;
pub mod calendar;
pub mod identity;
pub mod ledger;
pub mod policy;
pub mod seed;

pub use availability::AvailabilityChecker;
pub use booking::BookingEngine;
pub use calendar::DateRuleCalendar;
pub use identity::{IdentityService, LoginResult};
pub use ledger::PointLedger;
pub use policy::BookingPolicy;
pub use seed::{SeedReport, Seeder};

/// Business logic constants
pub mod constants {
    /// Shortest bookable stay
    pub const MIN_STAY_NIGHTS: i64 = 1;

    /// Check-in may lie this many days before today
    pub const PAST_CHECK_IN_GRACE_DAYS: i64 = 1;
}
