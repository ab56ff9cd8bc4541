//! State management module
//!
//! This module handles the per-event configuration documents and the
//! serialization of concurrent mutations against them.

pub mod locks;
pub mod store;

// Re-export commonly used state components
pub use locks::{EventGuard, EventLocks, SyncTicket};
pub use store::{ConfigurationStore, InMemoryConfigurationStore};
