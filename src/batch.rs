//! Batched filter updates.
//!
//! Rapid filter changes are merged into one pending [`FilterPatch`] and
//! released as a single update once the debounce window has been quiet.
//! [`DebouncedFilters`] adds a settling copy of caller-owned filters on top.

use crate::debounce::Debouncer;
use crate::error::FilterError;
use crate::filters::FilterPatch;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct FilterBatch {
    debounce: Debouncer<FilterPatch>,
}

impl FilterBatch {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            debounce: Debouncer::new(FilterPatch::new(), delay_ms),
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.debounce.delay_ms()
    }

    /// Merge `patch` into the pending overlay and restart the window.
    pub fn push(&mut self, patch: FilterPatch, now: f64) {
        let mut merged = self.debounce.pending().cloned().unwrap_or_default();
        merged.merge(patch);
        self.debounce.push(merged, now);
    }

    pub fn pending(&self) -> Option<&FilterPatch> {
        self.debounce.pending()
    }

    pub fn is_updating(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.debounce.deadline()
    }

    /// Release the merged patch if the window has elapsed.
    pub fn take_due(&mut self, now: f64) -> Option<FilterPatch> {
        self.debounce.take_due(now)
    }

    /// Release the merged patch now.
    pub fn flush(&mut self) -> Option<FilterPatch> {
        self.debounce.flush()
    }

    /// Drop pending updates without releasing them.
    pub fn discard(&mut self) {
        self.debounce.reset(FilterPatch::new());
    }

    /// `base` as it will look once the pending patch lands.
    pub fn overlay<T>(&self, base: &T) -> Result<T, FilterError>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        match self.pending() {
            Some(patch) => patch.apply_to(base),
            None => Ok(base.clone()),
        }
    }
}

/// Caller-owned filters that settle after a quiet window, plus batched
/// patches laid over the latest filters.
///
/// Both paths produce the filters to announce: [`DebouncedFilters::take_settled`]
/// when the caller's filters settle on a new value, and
/// [`DebouncedFilters::take_batch`] when a patch batch is released.
#[derive(Debug, Clone)]
pub struct DebouncedFilters<T> {
    settle: Debouncer<T>,
    latest: T,
    batch: FilterBatch,
}

impl<T> DebouncedFilters<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq,
{
    pub fn new(initial: T, delay_ms: u32) -> Self {
        Self {
            settle: Debouncer::new(initial.clone(), delay_ms),
            latest: initial,
            batch: FilterBatch::new(delay_ms),
        }
    }

    /// Record the caller's current filters. Returns whether they changed.
    pub fn observe(&mut self, filters: T, now: f64) -> bool {
        if filters == self.latest {
            return false;
        }
        self.latest = filters.clone();
        self.settle.push(filters, now);
        true
    }

    pub fn latest(&self) -> &T {
        &self.latest
    }

    pub fn debounced(&self) -> &T {
        self.settle.value()
    }

    pub fn batch(&self) -> &FilterBatch {
        &self.batch
    }

    pub fn is_settling(&self) -> bool {
        self.settle.is_pending()
    }

    /// True while the filters have not settled or a batch is pending.
    pub fn is_updating(&self) -> bool {
        self.latest != *self.settle.value() || self.batch.is_updating()
    }

    /// The newly settled filters, if the window has elapsed and they differ
    /// from the previously settled ones.
    pub fn take_settled(&mut self, now: f64) -> Option<T> {
        let before = self.settle.value().clone();
        let settled = self.settle.take_due(now)?;
        (settled != before).then_some(settled)
    }

    /// Like [`DebouncedFilters::take_settled`] without waiting for the window.
    pub fn flush_settled(&mut self) -> Option<T> {
        let before = self.settle.value().clone();
        let settled = self.settle.flush()?;
        (settled != before).then_some(settled)
    }

    pub fn batch_update(&mut self, patch: FilterPatch, now: f64) {
        self.batch.push(patch, now);
    }

    /// The latest filters with the released batch applied.
    pub fn take_batch(&mut self, now: f64) -> Option<T> {
        let patch = self.batch.take_due(now)?;
        self.release(patch)
    }

    pub fn flush_batch(&mut self) -> Option<T> {
        let patch = self.batch.flush()?;
        self.release(patch)
    }

    fn release(&self, patch: FilterPatch) -> Option<T> {
        match patch.apply_to(&self.latest) {
            Ok(merged) => Some(merged),
            Err(e) => {
                warn!("Dropping filter updates that do not fit: {e}");
                None
            }
        }
    }
}
