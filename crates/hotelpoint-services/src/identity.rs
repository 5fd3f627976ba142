//! Registration and login

use crate::ledger::PointLedger;
use hotelpoint_auth::{JwtService, PasswordService};
use hotelpoint_core::{
    models::{User, UserInfo, INITIAL_GRANT_REFERENCE},
    traits::UserLedgerStore,
    AppError, AppResult,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Issued token plus the profile it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserLedgerStore>,
    ledger: PointLedger,
    passwords: PasswordService,
    jwt: Arc<JwtService>,
    annual_grant: i64,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserLedgerStore>, jwt: Arc<JwtService>, annual_grant: i64) -> Self {
        Self {
            ledger: PointLedger::new(users.clone()),
            users,
            passwords: PasswordService::new(),
            jwt,
            annual_grant,
        }
    }

    /// Create a user and credit the initial annual grant
    #[instrument(skip(self, password))]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<User> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        if name.is_empty() {
            return Err(AppError::MissingField("name".to_string()));
        }

        if self.users.find_user_by_email(&email).await?.is_some() {
            warn!("Registration with existing email {}", email);
            return Err(AppError::AlreadyExists(format!(
                "user with email {} already exists",
                email
            )));
        }

        let hash = self.passwords.hash_password(password)?;
        let mut user = self
            .users
            .create_user(&User::new(name.to_string(), email, hash))
            .await?;

        if self.annual_grant > 0 {
            user.point_balance = self
                .ledger
                .grant(user.id, self.annual_grant, INITIAL_GRANT_REFERENCE)
                .await?;
        }

        info!("Registered user {} with {} points", user.id, user.point_balance);
        Ok(user)
    }

    /// Verify credentials and issue a token
    ///
    /// Unknown email and wrong password produce the same error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        let email = email.trim().to_lowercase();

        let user = match self.users.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown email {}", email);
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.passwords.verify_password(password, &user.password_hash)? {
            warn!("Wrong password for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.jwt.create_token_for_user(user.id, user.role)?;
        info!("User {} logged in", user.id);

        Ok(LoginResult {
            token,
            expires_in: self.jwt.expiration_secs(),
            user: UserInfo::from(user),
        })
    }

    pub async fn profile(&self, user_id: Uuid) -> AppResult<UserInfo> {
        self.users
            .find_user(user_id)
            .await?
            .map(UserInfo::from)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }
}
