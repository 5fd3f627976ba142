//! Booking handlers
//!
//! Pricing, creation, listing and cancellation for the calling user.

use crate::dto::booking::{BookingResponse, CalculateCostRequest, CostQuoteResponse, CreateBookingRequest};
use crate::dto::ApiResponse;
use crate::state::ApiState;
use actix_web::{web, HttpResponse};
use hotelpoint_auth::AuthenticatedUser;
use hotelpoint_core::AppError;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Quote a stay with its per-night breakdown
///
/// POST /api/v1/bookings/calculate
#[instrument(skip(state, _user, req))]
pub async fn calculate_cost(
    state: web::Data<ApiState>,
    _user: AuthenticatedUser,
    req: web::Json<CalculateCostRequest>,
) -> Result<HttpResponse, AppError> {
    debug!(room_id = %req.room_id, check_in = %req.check_in, check_out = %req.check_out, "Calculating cost");

    let quote = state
        .bounded(
            "calculate_cost",
            state.engine.quote(req.room_id, req.check_in, req.check_out),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        CostQuoteResponse::from(quote),
        "Point cost calculated successfully",
    )))
}

/// POST /api/v1/bookings
#[instrument(skip(state, user, req), fields(user_id = %user.user_id))]
pub async fn create_booking(
    state: web::Data<ApiState>,
    user: AuthenticatedUser,
    req: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let booking = state
        .bounded(
            "create_booking",
            state.engine.create_booking(
                user.user_id,
                req.hotel_id,
                req.room_id,
                req.check_in,
                req.check_out,
            ),
        )
        .await?;

    info!(booking_id = %booking.id, point_cost = booking.point_cost, "Booking created");

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        BookingResponse::from(booking),
        "Booking created successfully",
    )))
}

/// All bookings of the caller, newest first
///
/// GET /api/v1/bookings
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_bookings(
    state: web::Data<ApiState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let bookings = state
        .bounded("user_bookings", state.engine.user_bookings(user.user_id))
        .await?;

    let data: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// GET /api/v1/bookings/active
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_active_bookings(
    state: web::Data<ApiState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let bookings = state
        .bounded("active_bookings", state.engine.active_bookings(user.user_id))
        .await?;

    let data: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// GET /api/v1/bookings/{id}
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_booking(
    state: web::Data<ApiState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let booking_id = path.into_inner();
    let principal = user.principal();

    let booking = state
        .bounded("get_booking", state.engine.get_booking(booking_id, &principal))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Cancel and refund; owner or admin, outside the cancellation window
///
/// POST /api/v1/bookings/{id}/cancel
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn cancel_booking(
    state: web::Data<ApiState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let booking_id = path.into_inner();
    let principal = user.principal();

    let booking = state
        .bounded(
            "cancel_booking",
            state.engine.cancel_booking(booking_id, &principal),
        )
        .await?;

    info!(booking_id = %booking_id, refunded = booking.point_cost, "Booking cancelled");

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        BookingResponse::from(booking),
        "Booking cancelled successfully",
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(list_bookings))
            .route("", web::post().to(create_booking))
            .route("/calculate", web::post().to(calculate_cost))
            .route("/active", web::get().to(list_active_bookings))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}/cancel", web::post().to(cancel_booking)),
    );
}
