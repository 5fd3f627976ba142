//! HTTP request handlers

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod users;

pub use admin::configure as configure_admin;
pub use auth::configure as configure_auth;
pub use bookings::configure as configure_bookings;
pub use users::configure as configure_users;
