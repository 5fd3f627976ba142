//! Data Transfer Objects (DTOs) for API requests and responses

pub mod auth;
pub mod availability;
pub mod booking;
pub mod calendar;
pub mod common;
pub mod points;

pub use auth::*;
pub use availability::*;
pub use booking::*;
pub use calendar::*;
pub use common::*;
pub use points::*;
