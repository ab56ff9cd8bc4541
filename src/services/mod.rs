//! Services module
//!
//! This module contains business logic services

pub mod collaborators;
pub mod configuration;
pub mod flight_inventory;
pub mod flight_workflow;
pub mod grouping;
pub mod publication;
pub mod redis;
pub mod scoring;

// Re-export commonly used services
pub use collaborators::{BookingHistory, ConfigurationStore, EventDirectory, FlightInventory, GuestRoster, HotelCatalog};
pub use configuration::ConfigurationService;
pub use flight_inventory::HttpFlightInventory;
pub use flight_workflow::{FlightConfigurationWorkflow, InitializeOutcome, Route};
pub use grouping::{GroupFailure, GroupingEngine, SyncOutcome, SyncReport};
pub use publication::PublicationGate;
pub use redis::RedisService;
pub use scoring::ScoringEngine;

use std::sync::Arc;
use std::time::Duration;

use crate::config::settings::Settings;
use crate::state::EventLocks;

/// External systems the services depend on
#[derive(Clone)]
pub struct Collaborators {
    pub roster: Arc<dyn GuestRoster>,
    pub events: Arc<dyn EventDirectory>,
    pub catalog: Arc<dyn HotelCatalog>,
    pub history: Arc<dyn BookingHistory>,
    pub inventory: Arc<dyn FlightInventory>,
    pub store: Arc<dyn ConfigurationStore>,
}

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub configurations: ConfigurationService,
    pub grouping: Arc<GroupingEngine>,
    pub scoring: Arc<ScoringEngine>,
    pub flights: Arc<FlightConfigurationWorkflow>,
    pub publication: Arc<PublicationGate>,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services sharing one lock registry
    pub fn new(settings: &Settings, collaborators: Collaborators) -> Self {
        let locks = Arc::new(EventLocks::new(Duration::from_secs(settings.workflow.lock_wait_seconds)));
        let configurations = ConfigurationService::new(
            collaborators.store.clone(),
            collaborators.events.clone(),
            locks,
            settings.workflow.clone(),
        );

        let grouping = Arc::new(GroupingEngine::new(collaborators.roster.clone(), configurations.clone()));
        let scoring = Arc::new(ScoringEngine::new(
            collaborators.events.clone(),
            collaborators.catalog.clone(),
            collaborators.history.clone(),
            collaborators.roster.clone(),
            collaborators.store.clone(),
            settings.scoring.clone(),
        ));
        let flights = Arc::new(FlightConfigurationWorkflow::new(
            grouping.clone(),
            collaborators.inventory.clone(),
            configurations.clone(),
            Duration::from_secs(settings.flight_inventory.timeout_seconds),
        ));
        let publication = Arc::new(PublicationGate::new(configurations.clone()));

        Self {
            configurations,
            grouping,
            scoring,
            flights,
            publication,
        }
    }
}
