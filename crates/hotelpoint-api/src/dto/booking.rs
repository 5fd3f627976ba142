//! Booking DTOs

use chrono::{DateTime, NaiveDate, Utc};
use hotelpoint_core::models::{Booking, BookingStatus, CostQuote, DayCost, DayType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Price a stay without booking it
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateCostRequest {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// One night of a quote
#[derive(Debug, Clone, Serialize)]
pub struct DailyCostResponse {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub point_cost: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<DayCost> for DailyCostResponse {
    fn from(day: DayCost) -> Self {
        Self {
            date: day.date,
            day_type: day.day_type,
            point_cost: day.point_cost,
            name: day.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CostQuoteResponse {
    pub point_cost: i64,
    pub nights: usize,
    pub daily_details: Vec<DailyCostResponse>,
}

impl From<CostQuote> for CostQuoteResponse {
    fn from(quote: CostQuote) -> Self {
        Self {
            point_cost: quote.total,
            nights: quote.night_count(),
            daily_details: quote.nights.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub hotel_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Booking as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotel_id: Uuid,
    pub room_id: Uuid,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub point_cost: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            user_id: booking.user_id,
            hotel_id: booking.hotel_id,
            room_id: booking.room_id,
            check_in: booking.check_in,
            check_out: booking.check_out,
            point_cost: booking.point_cost,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

/// Admin status change
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Admin booking listing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilterParams {
    pub status: Option<String>,
}
