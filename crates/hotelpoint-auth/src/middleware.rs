//! Actix-web request extractors
//!
//! `AuthenticatedUser` turns a bearer token (or `token` cookie) into the
//! caller's principal. `AdminUser` additionally requires the admin role.

use crate::jwt::JwtService;
use crate::Claims;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use hotelpoint_core::error::AppError;
use hotelpoint_core::models::{Principal, UserRole};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Authorization header first, then the `token` cookie
fn extract_token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    req.cookie("token").map(|c| c.value().to_string())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let jwt_service = req
        .app_data::<web::Data<Arc<JwtService>>>()
        .map(|service| service.get_ref().clone())
        .ok_or_else(|| {
            warn!("JwtService not found in app data");
            AppError::Internal("Authentication service not configured".to_string())
        })?;

    let token = extract_token_from_request(req).ok_or_else(|| {
        debug!("No authentication token found in request");
        AppError::InvalidToken("No authentication token provided".to_string())
    })?;

    let claims = jwt_service.validate_token(&token)?;
    let user_id = claims.user_id()?;

    debug!(user_id = %user_id, role = %claims.role, "User authenticated");

    Ok(AuthenticatedUser {
        user_id,
        role: claims.role,
        claims,
    })
}

/// Authenticated caller
///
/// ```no_run
/// use actix_web::HttpResponse;
/// use hotelpoint_auth::AuthenticatedUser;
///
/// async fn whoami(user: AuthenticatedUser) -> HttpResponse {
///     HttpResponse::Ok().json(serde_json::json!({
///         "user_id": user.user_id,
///         "role": user.role,
///     }))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,

    pub role: UserRole,

    /// Full claims from the JWT token
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Identity handed to the booking core
    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id, self.role)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|e| {
            warn!(error = %e, "Authentication failed");
            e.into()
        }))
    }
}

/// Admin user extractor
///
/// Responds 403 when the caller is authenticated but not an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl std::ops::Deref for AdminUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_user = match authenticate(req) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Authentication failed");
                return ready(Err(e.into()));
            }
        };

        if !auth_user.is_admin() {
            warn!(
                user_id = %auth_user.user_id,
                role = %auth_user.role,
                "User attempted admin access without privileges"
            );
            return ready(Err(AppError::Forbidden.into()));
        }

        ready(Ok(AdminUser(auth_user)))
    }
}
