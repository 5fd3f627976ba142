//! Process bootstrap shared by the `hotelpoint` server and the `seed` binary

use anyhow::Context;
use hotelpoint_core::traits::Stores;
use hotelpoint_core::AppConfig;
use hotelpoint_db::{create_pool, pg_stores, run_migrations, MemoryStore};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
pub fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hotelpoint={lvl},seed={lvl},hotelpoint_api={lvl},hotelpoint_services={lvl},hotelpoint_db={lvl},actix_web=info,sqlx=warn",
            lvl = log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Postgres-backed stores when a URL is configured, the in-memory store otherwise
///
/// The flag is true for the in-memory store.
pub async fn build_stores(config: &AppConfig) -> anyhow::Result<(Stores, bool)> {
    if config.database.url.is_none() {
        warn!("No database URL configured, using the in-memory store");
        let (_, stores) = MemoryStore::new().into_stores();
        return Ok((stores, true));
    }

    info!("Connecting to database...");
    let pool = create_pool(&config.database)
        .await
        .context("failed to create database pool")?;

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .context("failed to run database migrations")?;
    }

    info!(
        "Database connection established with {} max connections",
        config.database.max_connections
    );
    Ok((pg_stores(pool), false))
}
