//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::models::group::MAX_SEARCH_WINDOW_DAYS;
use crate::utils::errors::{LogisticsError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_flight_inventory_config(&settings.flight_inventory)?;
    validate_workflow_config(&settings.workflow)?;
    validate_scoring_config(&settings.scoring)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LogisticsError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(LogisticsError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(LogisticsError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LogisticsError::Config(
            "Redis URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate flight inventory configuration
fn validate_flight_inventory_config(config: &super::FlightInventoryConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(LogisticsError::Config(
            "Flight inventory API URL is required".to_string()
        ));
    }

    url::Url::parse(&config.api_url)?;

    if config.timeout_seconds == 0 {
        return Err(LogisticsError::Config(
            "Flight inventory timeout must be greater than 0".to_string()
        ));
    }

    if config.requests_per_minute == 0 {
        return Err(LogisticsError::Config(
            "Flight inventory rate limit must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate workflow limits
fn validate_workflow_config(config: &super::WorkflowConfig) -> Result<()> {
    if !(1..=5).contains(&config.max_selected_flights) {
        return Err(LogisticsError::Config(
            format!("max_selected_flights must be between 1 and 5, got {}", config.max_selected_flights)
        ));
    }

    if config.search_window_days < 0 {
        return Err(LogisticsError::Config(
            "search_window_days cannot be negative".to_string()
        ));
    }

    if config.search_window_days > MAX_SEARCH_WINDOW_DAYS {
        return Err(LogisticsError::Config(
            format!("search_window_days cannot exceed {}", MAX_SEARCH_WINDOW_DAYS)
        ));
    }

    if config.lock_wait_seconds == 0 {
        return Err(LogisticsError::Config(
            "lock_wait_seconds must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate scoring weights
fn validate_scoring_config(config: &super::ScoringConfig) -> Result<()> {
    let weights = [
        config.price_weight,
        config.facility_weight,
        config.capacity_weight,
        config.location_weight,
    ];

    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(LogisticsError::Config(
            "Scoring weights must be non-negative numbers".to_string()
        ));
    }

    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(LogisticsError::Config(
            "At least one scoring weight must be positive".to_string()
        ));
    }

    if !(0.0..=1.0).contains(&config.personal_base_share) {
        return Err(LogisticsError::Config(
            "personal_base_share must be between 0 and 1".to_string()
        ));
    }

    if config.budget_tolerance < 0.0 {
        return Err(LogisticsError::Config(
            "budget_tolerance cannot be negative".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(LogisticsError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(LogisticsError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if config.directory.is_empty() || config.file_prefix.is_empty() {
        return Err(LogisticsError::Config(
            "Log directory and file prefix are required".to_string()
        ));
    }

    Ok(())
}
