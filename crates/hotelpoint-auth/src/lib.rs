//! Identity layer for HotelPoint
//!
//! JWT issuance and validation, Argon2 password hashing, and Actix-web
//! extractors that hand the booking core an authenticated [`Principal`].
//!
//! ```no_run
//! use actix_web::HttpResponse;
//! use hotelpoint_auth::{AdminUser, AuthenticatedUser};
//!
//! async fn my_bookings(user: AuthenticatedUser) -> HttpResponse {
//!     let principal = user.principal();
//!     HttpResponse::Ok().json(principal)
//! }
//!
//! async fn admin_only(_admin: AdminUser) -> HttpResponse {
//!     HttpResponse::NoContent().finish()
//! }
//! ```
//!
//! [`Principal`]: hotelpoint_core::models::Principal

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AdminUser, AuthenticatedUser};
pub use password::PasswordService;

#[cfg(test)]
mod tests {
    use super::*;
    use hotelpoint_core::models::UserRole;
    use uuid::Uuid;

    #[test]
    fn test_integration_jwt_and_password() {
        let password_service = PasswordService::new();
        let jwt_service = JwtService::new("test-secret-key-12345", 3600);

        let hash = password_service.hash_password("my_secure_password").unwrap();
        assert!(password_service
            .verify_password("my_secure_password", &hash)
            .unwrap());

        let user_id = Uuid::new_v4();
        let token = jwt_service.create_token_for_user(user_id, UserRole::User).unwrap();
        let principal = jwt_service.validate_token(&token).unwrap().principal().unwrap();

        assert_eq!(principal.user_id, user_id);
        assert!(!principal.is_admin());
    }
}
