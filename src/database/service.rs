//! Database service layer
//!
//! Bundles the Postgres repositories and hands them out as collaborators

use std::sync::Arc;

use crate::database::{
    DatabasePool, PgBookingHistory, PgEventDirectory, PgGuestRoster, PgHotelCatalog, PostgresConfigurationStore,
};
use crate::services::{Collaborators, FlightInventory};

#[derive(Clone)]
pub struct DatabaseService {
    pub configurations: PostgresConfigurationStore,
    pub guests: PgGuestRoster,
    pub hotels: PgHotelCatalog,
    pub bookings: PgBookingHistory,
    pub events: PgEventDirectory,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            configurations: PostgresConfigurationStore::new(pool.clone()),
            guests: PgGuestRoster::new(pool.clone()),
            hotels: PgHotelCatalog::new(pool.clone()),
            bookings: PgBookingHistory::new(pool.clone()),
            events: PgEventDirectory::new(pool),
        }
    }

    /// Wire the repositories into the services, with the given flight inventory
    pub fn collaborators(&self, inventory: Arc<dyn FlightInventory>) -> Collaborators {
        Collaborators {
            roster: Arc::new(self.guests.clone()),
            events: Arc::new(self.events.clone()),
            catalog: Arc::new(self.hotels.clone()),
            history: Arc::new(self.bookings.clone()),
            inventory,
            store: Arc::new(self.configurations.clone()),
        }
    }
}
