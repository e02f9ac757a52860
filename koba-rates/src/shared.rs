//! Process-wide handle to the current rate table snapshot.

use std::sync::{Arc, RwLock};

use crate::engine::PricingEngine;
use crate::table::RateTable;

/// Shared, swappable rate table.
///
/// Readers take an `Arc` snapshot and never observe a partially updated
/// table; a refresh replaces the whole snapshot and bumps its revision.
#[derive(Debug, Clone)]
pub struct SharedRates {
    current: Arc<RwLock<Arc<RateTable>>>,
}

impl SharedRates {
    pub fn new(table: RateTable) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<RateTable> {
        // The lock only guards an `Arc` swap, so a poisoned lock still holds
        // a complete table.
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Engine bound to the current snapshot.
    pub fn engine(&self) -> PricingEngine {
        PricingEngine::new(self.snapshot())
    }

    pub fn revision(&self) -> u64 {
        self.snapshot().revision()
    }

    /// Publishes `table` as the new snapshot and returns its revision.
    pub fn replace(&self, table: RateTable) -> u64 {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let revision = guard.revision() + 1;
        *guard = Arc::new(table.with_revision(revision));
        revision
    }
}

impl Default for SharedRates {
    fn default() -> Self {
        Self::new(RateTable::east_africa())
    }
}
