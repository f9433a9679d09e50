//! Persisted filters with debounced, batched commits.
//!
//! Updates land in a pending overlay straight away, so [`PersistentFilters::filters`]
//! reflects them immediately. The overlay is committed to the store (and to
//! storage) in one write once the debounce window has been quiet, or at once
//! through [`PersistentFilters::flush`].

use crate::batch::FilterBatch;
use crate::filters::{FilterPatch, FilterStore};
use crate::storage::FilterStorage;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Where a filter session is in its commit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitState {
    #[default]
    Idle,
    Pending,
    Committing,
}

#[derive(Debug)]
pub struct PersistentFilters<T, S> {
    store: FilterStore<T, S>,
    batch: FilterBatch,
    state: CommitState,
}

impl<T, S> PersistentFilters<T, S>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq,
    S: FilterStorage,
{
    pub fn open(storage: S, key: impl Into<String>, defaults: T, debounce_ms: u32) -> Self {
        Self {
            store: FilterStore::open(storage, key, defaults),
            batch: FilterBatch::new(debounce_ms),
            state: CommitState::Idle,
        }
    }

    /// Committed filters with any pending updates laid over them.
    pub fn filters(&self) -> T {
        match self.batch.overlay(self.store.filters()) {
            Ok(filters) => filters,
            Err(e) => {
                warn!("Pending filter updates do not fit, showing committed filters: {e}");
                self.store.filters().clone()
            }
        }
    }

    pub fn committed(&self) -> &T {
        self.store.filters()
    }

    pub fn store(&self) -> &FilterStore<T, S> {
        &self.store
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    pub fn is_updating(&self) -> bool {
        self.batch.is_updating()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.batch.deadline()
    }

    pub fn has_persisted_state(&self) -> bool {
        self.store.has_persisted_state()
    }

    pub fn batch_update_filters(&mut self, patch: FilterPatch, now: f64) {
        self.batch.push(patch, now);
        self.state = CommitState::Pending;
    }

    /// Commit pending updates whose window has elapsed. Returns whether a
    /// commit happened.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.batch.take_due(now) {
            Some(patch) => {
                self.commit(patch);
                true
            }
            None => false,
        }
    }

    /// Commit pending updates immediately, e.g. before the owner goes away.
    pub fn flush(&mut self) -> bool {
        match self.batch.flush() {
            Some(patch) => {
                self.commit(patch);
                true
            }
            None => false,
        }
    }

    fn commit(&mut self, patch: FilterPatch) {
        self.state = CommitState::Committing;
        debug!(
            "Committing {} filter update(s) to '{}'",
            patch.len(),
            self.store.storage_key()
        );
        if let Err(e) = self.store.update_filters(&patch) {
            warn!("Dropping filter updates that do not fit: {e}");
        }
        self.state = CommitState::Idle;
    }

    /// Drop pending updates, reset to defaults and delete the stored entry.
    pub fn clear_all_filters(&mut self) {
        self.batch.discard();
        self.store.clear_persisted_filters();
        self.state = CommitState::Idle;
        info!("Cleared filters under '{}'", self.store.storage_key());
    }
}
