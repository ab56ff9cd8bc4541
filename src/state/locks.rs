//! Per-event serialization of mutations
//!
//! Each event gets its own fair mutex, so mutations on one event run one at a
//! time in the order they asked for the lock, while other events proceed in
//! parallel. Synchronization runs additionally carry a generation ticket: a
//! newer live run for the same event makes older ones stale. A ticket stops
//! counting once it is dropped, so a newer run that gave up waiting for the
//! lock does not take an older run down with it.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::utils::errors::{LogisticsError, Result};

/// Held while mutating one event's configuration
pub type EventGuard = OwnedMutexGuard<()>;

pub struct EventLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
    generations: Mutex<HashMap<Uuid, Arc<Mutex<Generations>>>>,
    wait: Duration,
}

impl EventLocks {
    pub fn new(wait: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            generations: Mutex::new(HashMap::new()),
            wait,
        }
    }

    fn lock_for(&self, event_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(event_id).or_default().clone()
    }

    /// Wait (bounded) for exclusive access to the event
    pub async fn acquire(&self, event_id: Uuid) -> Result<EventGuard> {
        let lock = self.lock_for(event_id);
        match tokio::time::timeout(self.wait, lock.lock_owned()).await {
            Ok(guard) => {
                debug!(event_id = %event_id, "Event lock acquired");
                Ok(guard)
            }
            Err(_) => {
                warn!(event_id = %event_id, wait_ms = self.wait.as_millis() as u64, "Event lock wait timed out");
                Err(LogisticsError::LockTimeout { event_id })
            }
        }
    }

    /// Register a new synchronization run, making any older run for the event stale
    pub fn begin_sync(&self, event_id: Uuid) -> SyncTicket {
        let registry = {
            let mut generations = self.generations.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            generations.entry(event_id).or_default().clone()
        };
        let generation = {
            let mut live = lock_generations(&registry);
            live.issued += 1;
            let generation = live.issued;
            live.live.insert(generation);
            generation
        };
        SyncTicket {
            event_id,
            generation,
            registry,
        }
    }
}

impl Default for EventLocks {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

/// Tickets issued for one event and those still held
#[derive(Debug, Default)]
struct Generations {
    issued: u64,
    live: BTreeSet<u64>,
}

fn lock_generations(registry: &Mutex<Generations>) -> MutexGuard<'_, Generations> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Identifies one synchronization run; dropping it withdraws the run
#[derive(Debug)]
pub struct SyncTicket {
    event_id: Uuid,
    generation: u64,
    registry: Arc<Mutex<Generations>>,
}

impl SyncTicket {
    /// True while no newer run for the event is still alive
    pub fn is_current(&self) -> bool {
        lock_generations(&self.registry).live.last() == Some(&self.generation)
    }

    /// `Superseded` once a newer run for the same event has started
    pub fn ensure_current(&self) -> Result<()> {
        if self.is_current() {
            Ok(())
        } else {
            debug!(event_id = %self.event_id, generation = self.generation, "Synchronization superseded");
            Err(LogisticsError::Superseded { event_id: self.event_id })
        }
    }
}

impl Drop for SyncTicket {
    fn drop(&mut self) {
        lock_generations(&self.registry).live.remove(&self.generation);
    }
}
