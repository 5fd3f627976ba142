//! JWT Claims structure

use chrono::{Duration, Utc};
use hotelpoint_core::error::AppError;
use hotelpoint_core::models::{Principal, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims
///
/// `sub` carries the user id so the principal can be rebuilt without a
/// store lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// User role
    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for a user; expiration is filled in by `JwtService`
    ///
    /// ```
    /// use hotelpoint_auth::Claims;
    /// use hotelpoint_core::models::UserRole;
    /// use uuid::Uuid;
    ///
    /// let id = Uuid::new_v4();
    /// let claims = Claims::new(id, UserRole::User);
    /// assert_eq!(claims.user_id().unwrap(), id);
    /// ```
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            sub: user_id.to_string(),
            role,
            iat: Utc::now().timestamp(),
            exp: 0,
        }
    }

    /// Claims with an explicit lifetime in seconds
    pub fn with_expiration(user_id: Uuid, role: UserRole, expires_in_secs: i64) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::InvalidToken("subject is not a user id".to_string()))
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn principal(&self) -> Result<Principal, AppError> {
        Ok(Principal::new(self.user_id()?, self.role))
    }
}
