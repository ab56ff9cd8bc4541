//! EventLogistics maintenance runner
//!
//! Re-synchronizes the flight configuration of every event id given on the
//! command line, e.g. after a bulk roster import.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use uuid::Uuid;

use EventLogistics::{
    config::Settings,
    database::{connection::{create_pool, run_migrations, PoolConfig}, DatabaseService},
    services::{HttpFlightInventory, RedisService, ServiceFactory},
    state::InMemoryConfigurationStore,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load settings")?;
    settings.validate().context("invalid settings")?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", EventLogistics::info());

    let event_ids: Vec<Uuid> = std::env::args()
        .skip(1)
        .filter_map(|arg| match Uuid::parse_str(&arg) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(argument = %arg, error = %e, "Ignoring argument that is not an event id");
                None
            }
        })
        .collect();

    if event_ids.is_empty() {
        warn!("No event ids given; nothing to do");
        return Ok(());
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&PoolConfig::from(&settings.database))
        .await
        .context("failed to connect to the database")?;
    run_migrations(&db_pool).await.context("failed to run migrations")?;
    let database_service = DatabaseService::new(db_pool);

    // Flight search cache
    let cache = if settings.features.flight_search_cache {
        info!("Connecting to Redis...");
        let redis = RedisService::new(settings.redis.clone())?;
        match redis.health_check().await {
            Ok(true) => Some(redis),
            Ok(false) | Err(_) => {
                warn!("Redis unreachable; flight searches will not be cached");
                None
            }
        }
    } else {
        None
    };
    let inventory = Arc::new(
        HttpFlightInventory::new(settings.flight_inventory.clone(), cache)
            .context("failed to build the flight inventory client")?,
    );

    // Initialize services
    info!("Initializing services...");
    let mut collaborators = database_service.collaborators(inventory);
    if !settings.features.persist_to_database {
        warn!("Configuration persistence disabled; documents live only for this run");
        collaborators.store = Arc::new(InMemoryConfigurationStore::new());
    }
    let services = ServiceFactory::new(&settings, collaborators);

    let mut failures = 0;
    for event_id in event_ids {
        match services.flights.initialize(event_id).await {
            Ok(outcome) => {
                let stats = &outcome.configuration.stats;
                info!(
                    event_id = %event_id,
                    groups = stats.total_groups,
                    configured = stats.configured_groups,
                    guests = stats.total_guests,
                    empty = stats.empty_groups,
                    status = %outcome.configuration.status,
                    failed_groups = outcome.report.failed_groups.len(),
                    no_groups = outcome.no_groups,
                    "Event re-synchronized"
                );
            }
            Err(e) => {
                failures += 1;
                error!(event_id = %event_id, error = %e, severity = %e.severity(), "Failed to re-synchronize event");
            }
        }
    }

    info!(failures = failures, "Maintenance run finished");
    Ok(())
}
