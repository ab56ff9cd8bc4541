//! Locked access to configuration documents
//!
//! Every mutation goes through `mutate`: take the event lock, load the
//! current document, apply the change to a copy, save with the version check.
//! A failing change leaves the stored document untouched.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::models::Configuration;
use crate::services::collaborators::{ConfigurationStore, EventDirectory};
use crate::state::{EventGuard, EventLocks, SyncTicket};
use crate::utils::errors::{LogisticsError, Result};

#[derive(Clone)]
pub struct ConfigurationService {
    store: Arc<dyn ConfigurationStore>,
    events: Arc<dyn EventDirectory>,
    locks: Arc<EventLocks>,
    workflow: WorkflowConfig,
}

impl ConfigurationService {
    pub fn new(
        store: Arc<dyn ConfigurationStore>,
        events: Arc<dyn EventDirectory>,
        locks: Arc<EventLocks>,
        workflow: WorkflowConfig,
    ) -> Self {
        Self {
            store,
            events,
            locks,
            workflow,
        }
    }

    pub fn workflow(&self) -> &WorkflowConfig {
        &self.workflow
    }

    pub fn events(&self) -> &Arc<dyn EventDirectory> {
        &self.events
    }

    /// Current document, if the event was ever initialized
    pub async fn find(&self, event_id: Uuid) -> Result<Option<Configuration>> {
        self.store.load(event_id).await
    }

    /// Current document or `NotFound`
    pub async fn get(&self, event_id: Uuid) -> Result<Configuration> {
        self.find(event_id)
            .await?
            .ok_or_else(|| LogisticsError::not_found("configuration", event_id.to_string()))
    }

    pub async fn lock(&self, event_id: Uuid) -> Result<EventGuard> {
        self.locks.acquire(event_id).await
    }

    pub fn begin_sync(&self, event_id: Uuid) -> SyncTicket {
        self.locks.begin_sync(event_id)
    }

    /// Stored document, or a fresh unsaved one (version 0) built from the event.
    /// Callers must hold the event lock.
    pub async fn load_or_new(&self, event_id: Uuid) -> Result<Configuration> {
        if let Some(existing) = self.store.load(event_id).await? {
            return Ok(existing);
        }

        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| LogisticsError::not_found("event", event_id.to_string()))?;

        debug!(event_id = %event_id, "Creating configuration document");
        Ok(Configuration::new(&event, self.workflow.search_window_days, Utc::now()))
    }

    /// Insert unsaved documents, save the rest. Callers must hold the event lock.
    pub async fn persist(&self, configuration: &Configuration) -> Result<Configuration> {
        if configuration.version == 0 {
            let stored = self.store.insert(configuration).await?;
            info!(event_id = %stored.event_id, "Configuration created");
            Ok(stored)
        } else {
            self.store.save(configuration).await
        }
    }

    /// Apply `change` to the event's document under the event lock and save it
    pub async fn mutate<T, F>(&self, event_id: Uuid, change: F) -> Result<(Configuration, T)>
    where
        F: FnOnce(&mut Configuration) -> Result<T> + Send,
        T: Send,
    {
        let _guard = self.lock(event_id).await?;
        self.apply(event_id, change).await
    }

    /// `mutate` for callers that already hold the event lock
    pub async fn apply<T, F>(&self, event_id: Uuid, change: F) -> Result<(Configuration, T)>
    where
        F: FnOnce(&mut Configuration) -> Result<T> + Send,
        T: Send,
    {
        let mut configuration = self.get(event_id).await?;
        let output = change(&mut configuration)?;
        configuration.touch(Utc::now());

        let stored = self.persist(&configuration).await?;
        Ok((stored, output))
    }
}
