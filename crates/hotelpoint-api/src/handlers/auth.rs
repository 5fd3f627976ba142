//! Authentication handlers

use crate::dto::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::dto::ApiResponse;
use crate::state::ApiState;
use actix_web::{cookie::Cookie, web, HttpResponse};
use hotelpoint_core::models::UserInfo;
use hotelpoint_core::AppError;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Register a user with the initial point grant
///
/// POST /api/v1/auth/register
#[instrument(skip(state, req))]
pub async fn register(
    state: web::Data<ApiState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Register validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(email = %req.email, "Processing registration request");

    let user = state
        .bounded(
            "register",
            state.identity.register(&req.name, &req.email, &req.password),
        )
        .await?;

    info!(user_id = %user.id, "User registered");

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        UserInfo::from(user),
        "User registered successfully",
    )))
}

/// Login endpoint
///
/// POST /api/v1/auth/login
#[instrument(skip(state, req))]
pub async fn login(
    state: web::Data<ApiState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Login validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let result = state
        .bounded("login", state.identity.login(&req.email, &req.password))
        .await?;

    let cookie = Cookie::build("token", result.token.clone())
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(result.expires_in))
        .finish();

    let response = LoginResponse::new(result.token, result.expires_in, result.user);

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(response)))
}

/// Clear the token cookie
///
/// POST /api/v1/auth/logout
pub async fn logout() -> HttpResponse {
    let cookie = Cookie::build("token", "")
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(0))
        .finish();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::with_message((), "Logged out"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout)),
    );
}
