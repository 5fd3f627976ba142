//! Domain models for HotelPoint
//!
//! This module contains all the core domain models used throughout the application.

pub mod availability;
pub mod booking;
pub mod calendar;
pub mod catalog;
pub mod ledger;
pub mod user;

pub use availability::RoomAvailability;
pub use booking::{Booking, BookingStatus, LedgerEffect};
pub use calendar::{CostQuote, DateRule, DayCost, DayType, MAX_DAY_COST, MIN_DAY_COST};
pub use catalog::{Hotel, Room};
pub use ledger::{PointTransaction, TransactionKind, INITIAL_GRANT_REFERENCE};
pub use user::{Principal, User, UserInfo, UserRole};
