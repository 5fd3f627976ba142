//! Unified error handling for HotelPoint
//!
//! Every failure in the booking core is one of four kinds: validation,
//! not-found, business-rule conflict, or dependency failure. Each variant
//! carries a machine-readable code and maps to an HTTP status.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    // ==================== Authentication Errors ====================
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    // ==================== Business Logic Errors ====================
    #[error("Insufficient point balance: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("Room is not available for the selected dates")]
    RoomUnavailable,

    #[error("Room {room_id} does not belong to hotel {hotel_id}")]
    RoomHotelMismatch { room_id: String, hotel_id: String },

    #[error("Cannot cancel booking within {hours} hours of check-in")]
    CancellationWindow { hours: i64 },

    #[error("Booking already cancelled")]
    BookingAlreadyCancelled,

    #[error("Booking already completed")]
    BookingAlreadyCompleted,

    // ==================== Not Found Errors ====================
    #[error("Hotel not found: {0}")]
    HotelNotFound(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Date rule not found: {0}")]
    DateRuleNotFound(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid booking status: {0}")]
    InvalidStatus(String),

    // ==================== Resource Errors ====================
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_)
            | AppError::InvalidInput(_)
            | AppError::MissingField(_)
            | AppError::InvalidStatus(_)
            | AppError::RoomHotelMismatch { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::InvalidCredentials | AppError::InvalidToken(_) | AppError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            // 402 Payment Required
            AppError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,

            // 403 Forbidden
            AppError::Forbidden | AppError::Unauthorized(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::HotelNotFound(_)
            | AppError::RoomNotFound(_)
            | AppError::BookingNotFound(_)
            | AppError::UserNotFound(_)
            | AppError::DateRuleNotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::RoomUnavailable
            | AppError::CancellationWindow { .. }
            | AppError::BookingAlreadyCancelled
            | AppError::BookingAlreadyCompleted
            | AppError::Conflict(_)
            | AppError::AlreadyExists(_) => StatusCode::CONFLICT,

            // 503 Service Unavailable
            AppError::Pool(_) | AppError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::Timeout(_) => "timeout",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::TokenExpired => "token_expired",
            AppError::InvalidToken(_) => "invalid_token",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::PasswordHash(_) => "password_error",
            AppError::InsufficientBalance { .. } => "insufficient_balance",
            AppError::RoomUnavailable => "room_unavailable",
            AppError::RoomHotelMismatch { .. } => "room_hotel_mismatch",
            AppError::CancellationWindow { .. } => "cancellation_window",
            AppError::BookingAlreadyCancelled => "booking_already_cancelled",
            AppError::BookingAlreadyCompleted => "booking_already_completed",
            AppError::HotelNotFound(_) => "hotel_not_found",
            AppError::RoomNotFound(_) => "room_not_found",
            AppError::BookingNotFound(_) => "booking_not_found",
            AppError::UserNotFound(_) => "user_not_found",
            AppError::DateRuleNotFound(_) => "date_rule_not_found",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::InvalidStatus(_) => "invalid_status",
            AppError::Conflict(_) => "conflict",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// True for failures caused by the caller's request rather than by a dependency
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => AppError::Pool(err.to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}
