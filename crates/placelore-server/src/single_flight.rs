//! Per-place in-flight registry.
//!
//! Requests for the same normalized place queue on one slot, so only the
//! first of a burst reaches the generator; the rest find its stored result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as SlotLock, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct InFlight {
    slots: Mutex<HashMap<String, Arc<SlotLock<()>>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `key`. Released when the guard drops.
    pub async fn acquire(&self, key: &str) -> InFlightGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(key.to_string()).or_default().clone()
        };

        InFlightGuard {
            registry: self,
            key: key.to_string(),
            guard: Some(slot.lock_owned().await),
        }
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct InFlightGuard<'a> {
    registry: &'a InFlight,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Only the map's own reference left: nobody is holding or waiting.
        let mut slots = self
            .registry
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.key);
        }
    }
}
