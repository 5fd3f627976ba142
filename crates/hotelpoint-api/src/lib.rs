//! API layer for HotelPoint
//!
//! HTTP handlers for registration, point balances, bookings and the admin
//! calendar. Handlers are thin: they validate the request, call the booking
//! core through [`ApiState::bounded`] and map the result into a DTO.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod dto;
pub mod handlers;
pub mod state;

pub use dto::{ApiResponse, PaginationParams};
pub use state::ApiState;

use actix_web::web;

/// Every versioned route, meant to be mounted under `/api/v1`
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(handlers::configure_auth)
        .configure(handlers::configure_users)
        .configure(handlers::configure_bookings)
        .configure(handlers::configure_admin);
}
