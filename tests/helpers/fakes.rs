//! In-memory collaborators
//!
//! Stand-ins for the roster, event directory, hotel catalog, booking history
//! and flight inventory, with knobs for the failure modes the tests need.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use uuid::Uuid;

use EventLogistics::models::{EventProfile, FlightOption, FlightSearchQuery, Guest, Hotel, PastStay};
use EventLogistics::services::{BookingHistory, EventDirectory, FlightInventory, GuestRoster, HotelCatalog};
use EventLogistics::utils::{FlightInventoryError, LogisticsError, Result};

/// Roster whose contents tests can rewrite between calls
#[derive(Default)]
pub struct FakeRoster {
    guests: Mutex<HashMap<Uuid, Vec<Guest>>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

impl FakeRoster {
    pub fn set_guests(&self, event_id: Uuid, guests: Vec<Guest>) {
        self.guests.lock().unwrap().insert(event_id, guests);
    }

    /// Make every `list_guests` call wait for a permit on the returned semaphore
    pub fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuestRoster for FakeRoster {
    async fn list_guests(&self, event_id: Uuid) -> Result<Vec<Guest>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let permit = gate.acquire().await.unwrap();
            permit.forget();
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LogisticsError::Roster("roster backend down".to_string()));
        }
        Ok(self.guests.lock().unwrap().get(&event_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeEvents {
    events: Mutex<HashMap<Uuid, EventProfile>>,
}

impl FakeEvents {
    pub fn insert(&self, event: EventProfile) {
        self.events.lock().unwrap().insert(event.id, event);
    }
}

#[async_trait]
impl EventDirectory for FakeEvents {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventProfile>> {
        Ok(self.events.lock().unwrap().get(&event_id).cloned())
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    hotels: Mutex<HashMap<Uuid, Vec<Hotel>>>,
}

impl FakeCatalog {
    pub fn set_hotels(&self, event_id: Uuid, hotels: Vec<Hotel>) {
        self.hotels.lock().unwrap().insert(event_id, hotels);
    }
}

#[async_trait]
impl HotelCatalog for FakeCatalog {
    async fn list_selected_hotels(&self, event_id: Uuid) -> Result<Vec<Hotel>> {
        Ok(self.hotels.lock().unwrap().get(&event_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeHistory {
    stays: Mutex<HashMap<String, Vec<PastStay>>>,
    unavailable: AtomicBool,
}

impl FakeHistory {
    pub fn set_stays(&self, email: &str, stays: Vec<PastStay>) {
        self.stays.lock().unwrap().insert(email.to_lowercase(), stays);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookingHistory for FakeHistory {
    async fn past_stays(&self, guest_email: &str) -> Result<Vec<PastStay>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LogisticsError::Config("booking history offline".to_string()));
        }
        Ok(self.stays.lock().unwrap().get(guest_email).cloned().unwrap_or_default())
    }
}

/// Returns the stocked options whose route matches the query
#[derive(Default)]
pub struct FakeInventory {
    options: Mutex<Vec<FlightOption>>,
    delay: Mutex<Option<Duration>>,
    failing: AtomicBool,
    queries: Mutex<Vec<FlightSearchQuery>>,
}

impl FakeInventory {
    pub fn stock(&self, options: Vec<FlightOption>) {
        self.options.lock().unwrap().extend(options);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn queries(&self) -> Vec<FlightSearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlightInventory for FakeInventory {
    async fn search_flights(&self, query: &FlightSearchQuery) -> Result<Vec<FlightOption>> {
        self.queries.lock().unwrap().push(query.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(FlightInventoryError::ServiceUnavailable.into());
        }

        Ok(self
            .options
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.origin == query.origin && o.destination == query.destination)
            .filter(|o| o.journey_type == query.journey_type)
            .cloned()
            .collect())
    }
}
