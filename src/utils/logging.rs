//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the EventLogistics application.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::LoggingConfig;
use crate::models::JourneyType;
use crate::utils::errors::{LogisticsError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| LogisticsError::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log the outcome of a synchronization pass
pub fn log_sync_report(event_id: Uuid, groups: usize, failed: &[String], changed: bool) {
    if failed.is_empty() {
        info!(
            event_id = %event_id,
            groups = groups,
            changed = changed,
            "Groups synchronized"
        );
    } else {
        warn!(
            event_id = %event_id,
            groups = groups,
            failed = ?failed,
            changed = changed,
            "Groups synchronized with failures"
        );
    }
}

/// Log a guest moving between groups
pub fn log_guest_move(event_id: Uuid, guest: &str, from: &str, to: &str) {
    info!(
        event_id = %event_id,
        guest = guest,
        from = from,
        to = to,
        "Guest moved"
    );
}

/// Log a flight selection
pub fn log_selection(event_id: Uuid, group: &str, journey: JourneyType, options: usize) {
    info!(
        event_id = %event_id,
        group = group,
        journey = %journey,
        options = options,
        "Flight options selected"
    );
}

/// Log a publish attempt
pub fn log_publish_attempt(event_id: Uuid, ok: bool, missing: &[String]) {
    if ok {
        info!(event_id = %event_id, "Configuration published");
    } else {
        warn!(
            event_id = %event_id,
            missing = ?missing,
            "Configuration publication blocked"
        );
    }
}

/// Log errors from collaborators (roster, flight inventory, cache)
pub fn log_upstream_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "Upstream error occurred"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
