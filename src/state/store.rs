//! Configuration document storage
//!
//! Every store enforces the same optimistic discipline: a save only lands if
//! the stored version still equals the version the document was loaded at.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::Configuration;
use crate::utils::errors::{LogisticsError, Result};

/// Persistence for per-event configuration documents
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    async fn load(&self, event_id: Uuid) -> Result<Option<Configuration>>;

    /// Store a brand new document. Fails with `VersionConflict` if one already exists.
    async fn insert(&self, configuration: &Configuration) -> Result<Configuration>;

    /// Replace the stored document if its version still equals `configuration.version`.
    /// Returns the document as stored, with the bumped version.
    async fn save(&self, configuration: &Configuration) -> Result<Configuration>;
}

/// Process-local store, used by tests and single-node deployments
#[derive(Default)]
pub struct InMemoryConfigurationStore {
    documents: RwLock<HashMap<Uuid, Configuration>>,
}

impl InMemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl ConfigurationStore for InMemoryConfigurationStore {
    async fn load(&self, event_id: Uuid) -> Result<Option<Configuration>> {
        Ok(self.documents.read().await.get(&event_id).cloned())
    }

    async fn insert(&self, configuration: &Configuration) -> Result<Configuration> {
        let mut documents = self.documents.write().await;
        if let Some(existing) = documents.get(&configuration.event_id) {
            return Err(LogisticsError::VersionConflict {
                event_id: configuration.event_id,
                expected: 0,
                actual: existing.version,
            });
        }

        let mut stored = configuration.clone();
        stored.version = 1;
        documents.insert(stored.event_id, stored.clone());
        debug!(event_id = %stored.event_id, "Configuration inserted");
        Ok(stored)
    }

    async fn save(&self, configuration: &Configuration) -> Result<Configuration> {
        let mut documents = self.documents.write().await;
        let current = documents
            .get(&configuration.event_id)
            .ok_or_else(|| LogisticsError::not_found("configuration", configuration.event_id.to_string()))?;

        if current.version != configuration.version {
            return Err(LogisticsError::VersionConflict {
                event_id: configuration.event_id,
                expected: configuration.version,
                actual: current.version,
            });
        }

        let mut stored = configuration.clone();
        stored.version += 1;
        documents.insert(stored.event_id, stored.clone());
        debug!(event_id = %stored.event_id, version = stored.version, "Configuration saved");
        Ok(stored)
    }
}
