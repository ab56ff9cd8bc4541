//! EventLogistics
//!
//! Guest grouping, hotel recommendation and flight configuration for events.
//! This library partitions an event's guests into accommodation and location
//! groups, ranks the event's hotels per group and per guest, tracks per-group
//! flight selections and gates their publication to guests.

#![allow(non_snake_case)]

pub mod config;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{LogisticsError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::{Collaborators, ServiceFactory};
pub use state::{ConfigurationStore, EventLocks, InMemoryConfigurationStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
