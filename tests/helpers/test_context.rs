//! Test context for unified test setup
//!
//! Builds a `ServiceFactory` over in-memory collaborators and one seeded event.

use std::sync::Arc;

use uuid::Uuid;

use EventLogistics::config::Settings;
use EventLogistics::models::{Configuration, Guest, JourneyType};
use EventLogistics::services::{Collaborators, ServiceFactory};
use EventLogistics::state::InMemoryConfigurationStore;

use super::fakes::{FakeCatalog, FakeEvents, FakeHistory, FakeInventory, FakeRoster};
use super::test_data::{flight_options, sample_event};

pub struct TestContext {
    pub event_id: Uuid,
    pub settings: Settings,
    pub services: ServiceFactory,
    pub roster: Arc<FakeRoster>,
    pub events: Arc<FakeEvents>,
    pub catalog: Arc<FakeCatalog>,
    pub history: Arc<FakeHistory>,
    pub inventory: Arc<FakeInventory>,
    pub store: Arc<InMemoryConfigurationStore>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let event_id = Uuid::new_v4();
        let roster = Arc::new(FakeRoster::default());
        let events = Arc::new(FakeEvents::default());
        let catalog = Arc::new(FakeCatalog::default());
        let history = Arc::new(FakeHistory::default());
        let inventory = Arc::new(FakeInventory::default());
        let store = Arc::new(InMemoryConfigurationStore::new());

        events.insert(sample_event(event_id));

        let collaborators = Collaborators {
            roster: roster.clone(),
            events: events.clone(),
            catalog: catalog.clone(),
            history: history.clone(),
            inventory: inventory.clone(),
            store: store.clone(),
        };
        let services = ServiceFactory::new(&settings, collaborators);

        Self {
            event_id,
            settings,
            services,
            roster,
            events,
            catalog,
            history,
            inventory,
            store,
        }
    }

    /// Seed the roster and run the first synchronization
    pub async fn initialized_with(guests: Vec<Guest>) -> Self {
        let ctx = Self::new();
        ctx.roster.set_guests(ctx.event_id, guests);
        ctx.services
            .flights
            .initialize(ctx.event_id)
            .await
            .expect("initialize should succeed");
        ctx
    }

    pub async fn configuration(&self) -> Configuration {
        self.services
            .configurations
            .get(self.event_id)
            .await
            .expect("configuration should exist")
    }

    /// Select `count` options for both journeys of a group flying from `origin`
    pub async fn configure_group(&self, group: &str, origin: &str, count: usize) -> Configuration {
        self.services
            .flights
            .select(
                self.event_id,
                group,
                JourneyType::Arrival,
                flight_options(1, count, JourneyType::Arrival, origin, "GOI"),
            )
            .await
            .expect("arrival selection should succeed");
        self.services
            .flights
            .select(
                self.event_id,
                group,
                JourneyType::Departure,
                flight_options(1, count, JourneyType::Departure, "GOI", origin),
            )
            .await
            .expect("departure selection should succeed")
    }
}

/// Defaults with a short search timeout and lock wait
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.flight_inventory.timeout_seconds = 1;
    settings.workflow.lock_wait_seconds = 5;
    settings.features.flight_search_cache = false;
    settings.features.persist_to_database = false;
    settings
}
