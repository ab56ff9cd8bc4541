//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub flight_inventory: FlightInventoryConfig,
    pub workflow: WorkflowConfig,
    pub scoring: ScoringConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// External flight inventory API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlightInventoryConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub requests_per_minute: u32,
    pub cache_ttl_seconds: u64,
}

/// Flight configuration workflow limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Upper bound of options per (group, journey) selection
    pub max_selected_flights: usize,
    /// Days before the event start / after its end that flights may be searched
    pub search_window_days: i64,
    /// How long a mutation waits for the per-event lock
    pub lock_wait_seconds: u64,
}

/// Hotel scoring weights and hints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    pub price_weight: f64,
    pub facility_weight: f64,
    pub capacity_weight: f64,
    pub location_weight: f64,
    /// Share of the group score carried into a guest's personal score
    pub personal_base_share: f64,
    pub preferred_amenities: Vec<String>,
    /// Relative slack allowed above a budget before it counts as exceeded
    pub budget_tolerance: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    pub flight_search_cache: bool,
    pub persist_to_database: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables.
    ///
    /// Defaults apply first, then `config.toml` (optional), then
    /// `EVENTLOGISTICS__SECTION__KEY` variables.
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("EVENTLOGISTICS")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("scoring.preferred_amenities")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::LogisticsError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/event_logistics".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "eventlogistics:".to_string(),
                ttl_seconds: 3600,
            },
            flight_inventory: FlightInventoryConfig {
                api_url: "http://localhost:8081".to_string(),
                api_key: None,
                timeout_seconds: 10,
                requests_per_minute: 60,
                cache_ttl_seconds: 300,
            },
            workflow: WorkflowConfig::default(),
            scoring: ScoringConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_prefix: "eventlogistics.log".to_string(),
            },
            features: FeaturesConfig {
                flight_search_cache: true,
                persist_to_database: true,
            },
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_selected_flights: 5,
            search_window_days: 3,
            lock_wait_seconds: 10,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            price_weight: 0.30,
            facility_weight: 0.30,
            capacity_weight: 0.25,
            location_weight: 0.15,
            personal_base_share: 0.8,
            preferred_amenities: ["wifi", "pool", "gym", "spa", "restaurant", "bar"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            budget_tolerance: 0.25,
        }
    }
}
