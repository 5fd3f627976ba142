//! HotelPoint server
//!
//! Point-based hotel booking backend. Runs on PostgreSQL when
//! `HOTELPOINT__DATABASE__URL` is set and on the in-memory store otherwise.
//! The in-memory store starts seeded; Postgres is seeded with the `seed`
//! binary or `HOTELPOINT__SEED__ON_STARTUP=true`.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use hotelpoint::{build_stores, init_tracing};
use hotelpoint_api::{configure_api, ApiState};
use hotelpoint_auth::JwtService;
use hotelpoint_core::AppConfig;
use hotelpoint_services::{BookingEngine, BookingPolicy, IdentityService, Seeder};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_actix_web::TracingLogger;

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "hotelpoint",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(configure_api),
    );
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting HotelPoint v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("failed to load configuration")?;
    let (stores, in_memory) = build_stores(&config).await?;

    if config.seed.on_startup || in_memory {
        let report = Seeder::new(&stores)
            .run(&config.seed)
            .await
            .context("failed to seed bootstrap data")?;
        info!("Bootstrap data: {:?}", report);
    }

    let policy = BookingPolicy::from_config(&config.booking)?;
    let jwt_service = Arc::new(JwtService::from_config(&config.auth));
    info!(
        "Booking policy: timezone {}, cancellation window {}h, strict balance {}",
        policy.timezone(),
        policy.cancellation_window().num_hours(),
        policy.strict_balance()
    );

    let state = web::Data::new(ApiState::new(
        BookingEngine::new(&stores, policy),
        IdentityService::new(
            stores.users.clone(),
            jwt_service.clone(),
            config.booking.annual_grant_points,
        ),
        Duration::from_secs(config.server.timeout_secs),
    ));
    let jwt_data = web::Data::new(jwt_service);

    let cors_origins = env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let bind_addr = config.server_addr();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, config.server.workers
    );

    HttpServer::new(move || {
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                origin
                    .to_str()
                    .map(|o| cors_origins_inner.split(',').any(|allowed| allowed.trim() == o))
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::COOKIE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(jwt_data.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_body",
                        "message": error_message,
                        "status": 400,
                    })),
                )
                .into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_query",
                        "message": error_message,
                        "status": 400,
                    })),
                )
                .into()
            }))
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
    })
    .workers(config.server.workers)
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
