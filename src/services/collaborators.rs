//! Seams to the systems this core consumes
//!
//! Implementations live in `database::repositories` (Postgres) and
//! `services::flight_inventory` (HTTP); tests plug in in-memory fakes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{EventProfile, FlightOption, FlightSearchQuery, Guest, Hotel, PastStay};
use crate::utils::errors::Result;

pub use crate::state::store::ConfigurationStore;

/// Read-only view of an event's invited and registered guests
#[async_trait]
pub trait GuestRoster: Send + Sync {
    async fn list_guests(&self, event_id: Uuid) -> Result<Vec<Guest>>;
}

#[async_trait]
pub trait EventDirectory: Send + Sync {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventProfile>>;
}

/// Hotels the planner selected for the event, in registration order
#[async_trait]
pub trait HotelCatalog: Send + Sync {
    async fn list_selected_hotels(&self, event_id: Uuid) -> Result<Vec<Hotel>>;
}

/// A guest's completed stays across all events
#[async_trait]
pub trait BookingHistory: Send + Sync {
    async fn past_stays(&self, guest_email: &str) -> Result<Vec<PastStay>>;
}

#[async_trait]
pub trait FlightInventory: Send + Sync {
    async fn search_flights(&self, query: &FlightSearchQuery) -> Result<Vec<FlightOption>>;
}
