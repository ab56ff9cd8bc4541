//! Database repositories module
//!
//! Postgres implementations of the collaborator traits and the configuration store

pub mod configuration;
pub mod event;
pub mod hotel;
pub mod roster;

// Re-export repositories
pub use configuration::PostgresConfigurationStore;
pub use event::PgEventDirectory;
pub use hotel::{PgBookingHistory, PgHotelCatalog};
pub use roster::PgGuestRoster;
