//! HotelPoint Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the HotelPoint booking system. It includes:
//!
//! - Domain models (Booking, DateRule, RoomAvailability, User, PointTransaction)
//! - Capability traits for every persistence store the booking core talks to
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
