//! Admin handlers
//!
//! Booking status changes and hard deletes, room availability overrides and
//! special-date rules. Every route requires the admin role.

use crate::dto::availability::{AvailabilityResponse, RoomAvailabilityRequest};
use crate::dto::booking::{BookingFilterParams, BookingResponse, UpdateStatusRequest};
use crate::dto::calendar::{DateRuleResponse, SpecialDateRequest};
use crate::dto::{ApiResponse, DateRangeQuery, PaginationParams};
use crate::state::ApiState;
use actix_web::{web, HttpResponse};
use hotelpoint_auth::AdminUser;
use hotelpoint_core::models::{BookingStatus, DayType};
use hotelpoint_core::traits::Pagination;
use hotelpoint_core::AppError;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Page through all bookings, optionally by status
///
/// GET /api/v1/admin/bookings
#[instrument(skip(state, _admin))]
pub async fn list_bookings(
    state: web::Data<ApiState>,
    _admin: AdminUser,
    query: web::Query<PaginationParams>,
    filters: web::Query<BookingFilterParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let status = match filters.status.as_deref() {
        Some(raw) => Some(
            BookingStatus::from_str(raw)
                .ok_or_else(|| AppError::Validation(format!("invalid status '{}'", raw)))?,
        ),
        None => None,
    };

    let page = state
        .bounded(
            "list_bookings",
            state
                .engine
                .list_bookings(status, &Pagination::from(&*query)),
        )
        .await?;

    let data: Vec<BookingResponse> = page.data.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "data": data,
        "pagination": page.pagination,
    })))
}

/// PUT /api/v1/admin/bookings/{id}/status
#[instrument(skip(state, admin, req), fields(admin_id = %admin.user_id))]
pub async fn update_booking_status(
    state: web::Data<ApiState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Status update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let booking_id = path.into_inner();
    let booking = state
        .bounded(
            "update_booking_status",
            state.engine.update_booking_status(booking_id, &req.status),
        )
        .await?;

    info!(booking_id = %booking_id, status = %booking.status, "Booking status updated by admin");

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        BookingResponse::from(booking),
        "Booking status updated successfully",
    )))
}

/// Refund unless cancelled, then remove
///
/// DELETE /api/v1/admin/bookings/{id}
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn delete_booking(
    state: web::Data<ApiState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let booking_id = path.into_inner();
    state
        .bounded("delete_booking", state.engine.delete_booking(booking_id))
        .await?;

    info!(booking_id = %booking_id, "Booking deleted by admin");
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/v1/admin/rooms/availability
#[instrument(skip(state, admin, req), fields(admin_id = %admin.user_id))]
pub async fn set_room_availability(
    state: web::Data<ApiState>,
    admin: AdminUser,
    req: web::Json<RoomAvailabilityRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    let records = state
        .bounded(
            "set_availability",
            state.engine.availability().set_availability(
                req.room_id,
                req.from_date,
                req.to_date,
                req.available,
                req.user_ids,
            ),
        )
        .await?;

    let data: Vec<AvailabilityResponse> = records.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        data,
        "Room availability updated successfully",
    )))
}

/// GET /api/v1/admin/rooms/{id}/availability
#[instrument(skip(state, _admin))]
pub async fn get_room_availability(
    state: web::Data<ApiState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let records = state
        .bounded(
            "availability_in_range",
            state
                .engine
                .availability()
                .availability_in_range(path.into_inner(), query.from_date, query.to_date),
        )
        .await?;

    let data: Vec<AvailabilityResponse> = records.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// Create or replace the rule for a date
///
/// POST /api/v1/admin/dates/special
#[instrument(skip(state, admin, req), fields(admin_id = %admin.user_id))]
pub async fn set_special_date(
    state: web::Data<ApiState>,
    admin: AdminUser,
    req: web::Json<SpecialDateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Special date validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let req = req.into_inner();
    let day_type = DayType::from_str(&req.day_type).ok_or_else(|| {
        AppError::Validation(format!(
            "invalid day type '{}', expected regular, weekend or holiday",
            req.day_type
        ))
    })?;

    let rule = state
        .bounded(
            "set_special_date",
            state
                .engine
                .calendar()
                .set_special_date(req.date, day_type, req.point_cost, req.name),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        DateRuleResponse::from(rule),
        "Special date saved successfully",
    )))
}

/// GET /api/v1/admin/dates/special
#[instrument(skip(state, _admin))]
pub async fn list_special_dates(
    state: web::Data<ApiState>,
    _admin: AdminUser,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let rules = state
        .bounded(
            "rules_in_range",
            state
                .engine
                .calendar()
                .rules_in_range(query.from_date, query.to_date),
        )
        .await?;

    let data: Vec<DateRuleResponse> = rules.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// DELETE /api/v1/admin/dates/special/{id}
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn delete_special_date(
    state: web::Data<ApiState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state
        .bounded(
            "delete_special_date",
            state.engine.calendar().delete_special_date(path.into_inner()),
        )
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/bookings", web::get().to(list_bookings))
            .route("/bookings/{id}/status", web::put().to(update_booking_status))
            .route("/bookings/{id}", web::delete().to(delete_booking))
            .route("/rooms/availability", web::post().to(set_room_availability))
            .route("/rooms/{id}/availability", web::get().to(get_room_availability))
            .route("/dates/special", web::post().to(set_special_date))
            .route("/dates/special", web::get().to(list_special_dates))
            .route("/dates/special/{id}", web::delete().to(delete_special_date)),
    );
}
