//! Seed sample hotels, this year's holidays and the admin account
//!
//! Uses the same configuration layers as the server. Safe to run repeatedly.
//! Against the in-memory store the data lives only as long as this process.

use anyhow::Context;
use hotelpoint::{build_stores, init_tracing};
use hotelpoint_core::AppConfig;
use hotelpoint_services::Seeder;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load().context("failed to load configuration")?;
    let (stores, in_memory) = build_stores(&config).await?;
    if in_memory {
        warn!("Seeding the in-memory store, nothing will persist after exit");
    }

    let report = Seeder::new(&stores)
        .run(&config.seed)
        .await
        .context("seeding failed")?;

    info!(
        "Created {} hotels, {} rooms, {} holidays, admin created: {}",
        report.hotels_created, report.rooms_created, report.holidays_created, report.admin_created
    );
    Ok(())
}
