//! In-memory implementation of `AuditStore`.
//!
//! The reference append-only trail: a `Vec` behind a `Mutex`, safe to share
//! across threads while gates record events and the admin listing pages
//! through them.

use std::sync::{Arc, Mutex};

use siwes_contracts::{
    audit::AuditEvent,
    error::{TrackError, TrackResult},
};
use siwes_core::traits::AuditStore;

/// An in-memory, append-only audit store.
#[derive(Default, Clone)]
pub struct InMemoryAuditStore {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events appended so far.
    pub fn len(&self) -> usize {
        self.events.lock().expect("audit store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A full copy of the trail in append order.
    pub fn all(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit store lock poisoned").clone()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn append(&self, event: &AuditEvent) -> TrackResult<()> {
        let mut events = self.events.lock().map_err(|e| TrackError::Storage {
            reason: format!("audit store lock poisoned: {e}"),
        })?;
        events.push(event.clone());
        Ok(())
    }

    fn recent(&self, limit: usize, offset: usize) -> TrackResult<Vec<AuditEvent>> {
        let events = self.events.lock().map_err(|e| TrackError::Storage {
            reason: format!("audit store lock poisoned: {e}"),
        })?;
        Ok(events
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
