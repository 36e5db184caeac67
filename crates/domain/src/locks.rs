//! Per-principal critical sections.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use common::PrincipalId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Serializes cart operations of one principal while letting different
/// principals proceed in parallel.
///
/// The guard is held across load, decide and persist, so two requests of the
/// same principal cannot interleave between reading the open cart and writing it.
#[derive(Debug, Default)]
pub struct PrincipalLocks {
    slots: Mutex<HashMap<PrincipalId, Arc<AsyncMutex<()>>>>,
}

impl PrincipalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `principal`'s cart.
    pub async fn acquire(&self, principal: PrincipalId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            // Slots nobody holds or waits on can go.
            slots.retain(|id, slot| *id == principal || Arc::strong_count(slot) > 1);
            slots.entry(principal).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Number of principals with a live slot.
    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or_else(|e| e.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
