//! Profile and point handlers for the calling user

use crate::dto::points::{BalanceResponse, TransactionResponse};
use crate::dto::ApiResponse;
use crate::state::ApiState;
use actix_web::{web, HttpResponse};
use hotelpoint_auth::AuthenticatedUser;
use hotelpoint_core::AppError;
use tracing::instrument;

/// GET /api/v1/users/profile
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_profile(
    state: web::Data<ApiState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let profile = state
        .bounded("profile", state.identity.profile(user.user_id))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}

/// GET /api/v1/users/points
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_point_balance(
    state: web::Data<ApiState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let point_balance = state
        .bounded("balance_of", state.engine.ledger().balance_of(user.user_id))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(BalanceResponse {
        user_id: user.user_id,
        point_balance,
    })))
}

/// Newest first
///
/// GET /api/v1/users/points/history
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_point_history(
    state: web::Data<ApiState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let history = state
        .bounded("history_of", state.engine.ledger().history_of(user.user_id))
        .await?;

    let data: Vec<TransactionResponse> = history.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/profile", web::get().to(get_profile))
            .route("/points", web::get().to(get_point_balance))
            .route("/points/history", web::get().to(get_point_history)),
    );
}
