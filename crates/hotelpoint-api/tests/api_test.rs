//! HTTP tests for the versioned API over the in-memory store

use actix_web::{http::StatusCode, test, web, App};
use hotelpoint_api::{configure_api, ApiState};
use hotelpoint_auth::JwtService;
use hotelpoint_core::models::{Hotel, Room, User, UserRole};
use hotelpoint_db::MemoryStore;
use hotelpoint_services::{BookingEngine, BookingPolicy, IdentityService};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const SECRET: &str = "api-test-secret";

struct Fixture {
    store: Arc<MemoryStore>,
    state: web::Data<ApiState>,
    jwt: web::Data<Arc<JwtService>>,
    hotel: Hotel,
    room: Room,
}

impl Fixture {
    fn new() -> Self {
        let (store, stores) = MemoryStore::new().into_stores();
        let jwt = Arc::new(JwtService::new(SECRET, 3600));
        let state = ApiState::new(
            BookingEngine::new(&stores, BookingPolicy::default()),
            IdentityService::new(store.clone(), jwt.clone(), 24),
            Duration::from_secs(5),
        );

        let hotel = store.insert_hotel(Hotel::new("Ubud Retreat"));
        let room = store.insert_room(Room::new(hotel.id, "101", 2));

        Self {
            store,
            state: web::Data::new(state),
            jwt: web::Data::new(jwt),
            hotel,
            room,
        }
    }

    fn user_with(&self, email: &str, balance: i64, role: UserRole) -> (User, String) {
        let user = self.store.insert_user(User {
            point_balance: balance,
            role,
            ..User::new("Test".into(), email.into(), "unused".into())
        });
        let token = self.jwt.create_token_for_user(user.id, role).unwrap();
        (user, token)
    }
}

macro_rules! spawn_app {
    ($fx:expr) => {
        test::init_service(
            App::new()
                .app_data($fx.state.clone())
                .app_data($fx.jwt.clone())
                .service(web::scope("/api/v1").configure(configure_api)),
        )
        .await
    };
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn register_login_and_read_balance() {
    let fx = Fixture::new();
    let app = spawn_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "name": "Hana",
            "email": "hana@example.com",
            "password": "rahasia123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["point_balance"], 24);
    assert_eq!(body["data"]["role"], "user");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "hana@example.com", "password": "rahasia123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["token_type"], "Bearer");
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/users/points")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["point_balance"], 24);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/points/history")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0]["type"], "annual_grant");
    assert_eq!(body["data"][0]["amount"], 24);
}

#[actix_web::test]
async fn register_rejects_short_password() {
    let fx = Fixture::new();
    let app = spawn_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "name": "Indra",
            "email": "indra@example.com",
            "password": "123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
}

#[actix_web::test]
async fn wrong_password_is_unauthorized() {
    let fx = Fixture::new();
    let app = spawn_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "name": "Joko",
            "email": "joko@example.com",
            "password": "rahasia123"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "joko@example.com", "password": "salah" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_credentials");
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let fx = Fixture::new();
    let app = spawn_app!(fx);

    let req = test::TestRequest::get().uri("/api/v1/users/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn regular_user_cannot_reach_admin_routes() {
    let fx = Fixture::new();
    let (_, token) = fx.user_with("kiki@example.com", 10, UserRole::User);
    let app = spawn_app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/bookings")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn calculate_returns_nightly_breakdown() {
    let fx = Fixture::new();
    let (_, token) = fx.user_with("lala@example.com", 10, UserRole::User);
    let app = spawn_app!(fx);

    // Monday to Wednesday
    let req = test::TestRequest::post()
        .uri("/api/v1/bookings/calculate")
        .insert_header(bearer(&token))
        .set_json(json!({
            "room_id": fx.room.id,
            "check_in": "2030-06-03",
            "check_out": "2030-06-05"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["point_cost"], 2);
    assert_eq!(body["data"]["nights"], 2);
    assert_eq!(body["data"]["daily_details"][0]["date"], "2030-06-03");
    assert_eq!(body["data"]["daily_details"][0]["day_type"], "regular");
}

#[actix_web::test]
async fn create_then_cancel_restores_balance() {
    let fx = Fixture::new();
    let (_, token) = fx.user_with("mira@example.com", 10, UserRole::User);
    let app = spawn_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .insert_header(bearer(&token))
        .set_json(json!({
            "hotel_id": fx.hotel.id,
            "room_id": fx.room.id,
            "check_in": "2030-06-03",
            "check_out": "2030-06-05"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["point_cost"], 2);
    assert_eq!(body["data"]["status"], "confirmed");
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/users/points")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["point_balance"], 8);

    let req = test::TestRequest::get()
        .uri("/api/v1/bookings/active")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/bookings/{}/cancel", booking_id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "cancelled");

    let req = test::TestRequest::get()
        .uri("/api/v1/users/points")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["point_balance"], 10);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/bookings/{}/cancel", booking_id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "booking_already_cancelled");
}

#[actix_web::test]
async fn booking_without_points_is_payment_required() {
    let fx = Fixture::new();
    let (_, token) = fx.user_with("nina@example.com", 1, UserRole::User);
    let app = spawn_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .insert_header(bearer(&token))
        .set_json(json!({
            "hotel_id": fx.hotel.id,
            "room_id": fx.room.id,
            "check_in": "2030-06-03",
            "check_out": "2030-06-05"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "insufficient_balance");
    assert_eq!(fx.store.booking_count(), 0);
}

#[actix_web::test]
async fn other_users_booking_is_hidden() {
    let fx = Fixture::new();
    let (_, owner) = fx.user_with("oki@example.com", 10, UserRole::User);
    let (_, stranger) = fx.user_with("putu@example.com", 10, UserRole::User);
    let app = spawn_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .insert_header(bearer(&owner))
        .set_json(json!({
            "hotel_id": fx.hotel.id,
            "room_id": fx.room.id,
            "check_in": "2030-06-03",
            "check_out": "2030-06-04"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/bookings/{}", booking_id))
        .insert_header(bearer(&stranger))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/bookings/{}/cancel", booking_id))
        .insert_header(bearer(&stranger))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_special_date_changes_quote() {
    let fx = Fixture::new();
    let (_, admin) = fx.user_with("admin@example.com", 0, UserRole::Admin);
    let (_, token) = fx.user_with("rina@example.com", 10, UserRole::User);
    let app = spawn_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/dates/special")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "date": "2030-06-04",
            "type": "holiday",
            "point_cost": 3,
            "name": "Founders Day"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["type"], "holiday");

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/dates/special?from_date=2030-06-01&to_date=2030-06-30")
        .insert_header(bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri("/api/v1/bookings/calculate")
        .insert_header(bearer(&token))
        .set_json(json!({
            "room_id": fx.room.id,
            "check_in": "2030-06-03",
            "check_out": "2030-06-05"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["point_cost"], 4);
    assert_eq!(body["data"]["daily_details"][1]["name"], "Founders Day");
}

#[actix_web::test]
async fn admin_special_date_rejects_out_of_range_cost() {
    let fx = Fixture::new();
    let (_, admin) = fx.user_with("admin@example.com", 0, UserRole::Admin);
    let app = spawn_app!(fx);

    for payload in [
        json!({ "date": "2030-06-04", "type": "holiday", "point_cost": 5 }),
        json!({ "date": "2030-06-04", "type": "festival", "point_cost": 2 }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/admin/dates/special")
            .insert_header(bearer(&admin))
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn admin_blocks_room_for_a_range() {
    let fx = Fixture::new();
    let (_, admin) = fx.user_with("admin@example.com", 0, UserRole::Admin);
    let (_, token) = fx.user_with("sari@example.com", 10, UserRole::User);
    let app = spawn_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/rooms/availability")
        .insert_header(bearer(&admin))
        .set_json(json!({
            "room_id": fx.room.id,
            "from_date": "2030-06-03",
            "to_date": "2030-06-05",
            "available": false
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/admin/rooms/{}/availability?from_date=2030-06-01&to_date=2030-06-30",
            fx.room.id
        ))
        .insert_header(bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let req = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .insert_header(bearer(&token))
        .set_json(json!({
            "hotel_id": fx.hotel.id,
            "room_id": fx.room.id,
            "check_in": "2030-06-04",
            "check_out": "2030-06-06"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "room_unavailable");
}

#[actix_web::test]
async fn admin_lists_updates_and_deletes_bookings() {
    let fx = Fixture::new();
    let (_, admin) = fx.user_with("admin@example.com", 0, UserRole::Admin);
    let (user, token) = fx.user_with("tono@example.com", 10, UserRole::User);
    let app = spawn_app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .insert_header(bearer(&token))
        .set_json(json!({
            "hotel_id": fx.hotel.id,
            "room_id": fx.room.id,
            "check_in": "2030-06-03",
            "check_out": "2030-06-05"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/bookings?status=confirmed&page=1&per_page=10")
        .insert_header(bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["user_id"], user.id.to_string());

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/bookings?status=lost")
        .insert_header(bearer(&admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/admin/bookings/{}/status", booking_id))
        .insert_header(bearer(&admin))
        .set_json(json!({ "status": "completed" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "completed");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/admin/bookings/{}", booking_id))
        .insert_header(bearer(&admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(fx.store.booking_count(), 0);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/admin/bookings/{}", booking_id))
        .insert_header(bearer(&admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
