//! Application configuration
//!
//! Configuration is layered with the `config` crate: built-in defaults, then
//! `config/default` and `config/{RUN_MODE}` files, then `HOTELPOINT__*`
//! environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Upper bound on a single store-backed operation, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_timeout() -> u64 {
    30
}

/// Database configuration
///
/// When `url` is absent the server runs on the in-memory store.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Apply pending migrations on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_run_migrations() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: default_run_migrations(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,

    /// JWT token expiration in minutes
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_minutes: i64,
}

fn default_jwt_expiration() -> i64 {
    1440 // 24 hours
}

/// Booking policy configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    /// IANA name of the zone stay times are expressed in
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Local hour at which a stay starts
    #[serde(default = "default_check_in_hour")]
    pub check_in_hour: u32,

    /// Local hour at which a stay ends
    #[serde(default = "default_check_out_hour")]
    pub check_out_hour: u32,

    /// Cancellations are refused this many hours before check-in
    #[serde(default = "default_cancellation_window")]
    pub cancellation_window_hours: i64,

    /// Points credited on registration
    #[serde(default = "default_annual_grant")]
    pub annual_grant_points: i64,

    /// Debit with a conditional update so the balance can never go negative
    #[serde(default)]
    pub strict_balance: bool,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_check_in_hour() -> u32 {
    14
}

fn default_check_out_hour() -> u32 {
    12
}

fn default_cancellation_window() -> i64 {
    24
}

fn default_annual_grant() -> i64 {
    24
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            check_in_hour: default_check_in_hour(),
            check_out_hour: default_check_out_hour(),
            cancellation_window_hours: default_cancellation_window(),
            annual_grant_points: default_annual_grant(),
            strict_balance: false,
        }
    }
}

/// Bootstrap data: sample catalog, holidays and the first admin
///
/// The server seeds at startup when `on_startup` is set or when it runs on
/// the in-memory store. The `seed` binary always seeds.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    #[serde(default)]
    pub on_startup: bool,

    #[serde(default = "default_admin_name")]
    pub admin_name: String,

    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    #[serde(default = "default_admin_points")]
    pub admin_points: i64,
}

fn default_admin_name() -> String {
    "Admin".to_string()
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_admin_points() -> i64 {
    100
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            on_startup: false,
            admin_name: default_admin_name(),
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
            admin_points: default_admin_points(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("server.timeout_secs", 30)?
            .set_default("auth.jwt_expiration_minutes", 1440)?
            .set_default("booking.timezone", "UTC")?
            .set_default("booking.check_in_hour", 14)?
            .set_default("booking.check_out_hour", 12)?
            .set_default("booking.cancellation_window_hours", 24)?
            .set_default("booking.annual_grant_points", 24)?
            .set_default("booking.strict_balance", false)?
            .set_default("seed.on_startup", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // HOTELPOINT__AUTH__JWT_SECRET, HOTELPOINT__DATABASE__URL, ...
            .add_source(
                Environment::with_prefix("HOTELPOINT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("HOTELPOINT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
