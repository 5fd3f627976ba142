//! HotelPoint Database Layer
//!
//! This crate provides the store implementations behind the booking core:
//!
//! - Connection pool management and embedded migrations with sqlx
//! - PostgreSQL repositories for every store trait
//! - A transactional ledger write and a conditional debit for balances
//! - An in-memory store for tests and database-less runs

pub mod memory;
pub mod pool;
pub mod repositories;

pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use hotelpoint_core::{AppError, AppResult};
pub use sqlx::PgPool;
