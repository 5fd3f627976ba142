//! Repository implementations
//!
//! Concrete PostgreSQL implementations of the store traits defined in
//! hotelpoint-core, using sqlx.

pub mod availability_repo;
pub mod booking_repo;
pub mod date_rule_repo;
pub mod hotel_repo;
pub mod user_repo;

pub use availability_repo::PgAvailabilityRepository;
pub use booking_repo::PgBookingRepository;
pub use date_rule_repo::PgDateRuleRepository;
pub use hotel_repo::PgHotelRepository;
pub use user_repo::PgUserRepository;

use hotelpoint_core::traits::Stores;
use sqlx::PgPool;
use std::sync::Arc;

/// Build the store bundle backed by one connection pool
pub fn pg_stores(pool: PgPool) -> Stores {
    Stores {
        hotels: Arc::new(PgHotelRepository::new(pool.clone())),
        calendar: Arc::new(PgDateRuleRepository::new(pool.clone())),
        availability: Arc::new(PgAvailabilityRepository::new(pool.clone())),
        bookings: Arc::new(PgBookingRepository::new(pool.clone())),
        users: Arc::new(PgUserRepository::new(pool)),
    }
}
