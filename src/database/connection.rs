//! Postgres pool for the roster, hotel catalog, event directory and
//! configuration documents, plus the embedded schema migrations.

use std::time::{Duration, Instant};

use sqlx::{Pool, Postgres};
use tracing::info;
use url::Url;

use crate::config::DatabaseConfig;
use crate::utils::errors::LogisticsError;
use crate::utils::logging::log_database_operation;

pub type DatabasePool = Pool<Postgres>;

/// Pool sizing and timeouts. Configuration saves hold a connection only for
/// one versioned UPDATE, so a small pool goes a long way.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/event_logistics".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

impl From<&DatabaseConfig> for PoolConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            ..Self::default()
        }
    }
}

/// Host and database name of a connection URL, without credentials
pub fn describe_target(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => format!(
            "{}{}",
            parsed.host_str().unwrap_or("localhost"),
            parsed.path()
        ),
        Err(_) => "<unparseable url>".to_string(),
    }
}

/// Connect and make sure the server answers before handing the pool out
pub async fn create_pool(config: &PoolConfig) -> Result<DatabasePool, LogisticsError> {
    let target = describe_target(&config.url);
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;

    info!(
        target_db = %target,
        max_connections = config.max_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Apply the embedded migrations (events, guests, hotels, bookings and
/// configuration documents)
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), LogisticsError> {
    let started = Instant::now();
    let result = sqlx::migrate!("./migrations").run(pool).await;
    log_database_operation(
        "migrate",
        "_sqlx_migrations",
        started.elapsed().as_millis() as u64,
        result.is_ok(),
    );
    result?;
    Ok(())
}
