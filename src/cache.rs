//! Per-session cache for search results.
//!
//! Results are keyed by the exact search term and stamped with the time they
//! were stored. An entry is served while it is younger than the TTL; older
//! entries count as misses and are overwritten by the next successful search.
//!
//! # Eviction
//! When an insert pushes the cache past its capacity, the entry with the
//! oldest insertion timestamp is removed. Reads do not refresh an entry, so
//! this is first-in-first-out by insertion time, not LRU. Re-inserting a term
//! stamps it as new.
//!
//! Each search session owns its own cache; nothing is shared between hook
//! instances.

use crate::config::{CACHE_DURATION_MS, MAX_CACHE_ENTRIES};
use log::debug;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    results: T,
    timestamp: f64,
    // Tie-breaker for entries stored within the same millisecond
    order: u64,
}

#[derive(Debug, Clone)]
pub struct SearchCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    ttl_ms: f64,
    max_entries: usize,
    next_order: u64,
}

impl<T: Clone> Default for SearchCache<T> {
    fn default() -> Self {
        Self::new(CACHE_DURATION_MS, MAX_CACHE_ENTRIES)
    }
}

impl<T: Clone> SearchCache<T> {
    pub fn new(ttl_ms: f64, max_entries: usize) -> Self {
        Self {
            // Capacity is host-configurable; only the hint is bounded.
            entries: HashMap::with_capacity(max_entries.min(MAX_CACHE_ENTRIES).saturating_add(1)),
            ttl_ms,
            max_entries,
            next_order: 0,
        }
    }

    /// Cached results for `term` if they are still fresh at `now`.
    pub fn get(&self, term: &str, now: f64) -> Option<T> {
        let entry = self.entries.get(term)?;
        if now - entry.timestamp < self.ttl_ms {
            Some(entry.results.clone())
        } else {
            debug!("Cache entry for {term:?} expired");
            None
        }
    }

    pub fn insert(&mut self, term: impl Into<String>, results: T, now: f64) {
        let order = self.next_order;
        self.next_order += 1;
        self.entries.insert(
            term.into(),
            CacheEntry {
                results,
                timestamp: now,
                order,
            },
        );

        while self.entries.len() > self.max_entries {
            if !self.evict_oldest() {
                break;
            }
        }
    }

    fn evict_oldest(&mut self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by(|(_, a), (_, b)| {
                a.timestamp
                    .total_cmp(&b.timestamp)
                    .then(a.order.cmp(&b.order))
            })
            .map(|(term, _)| term.clone());

        match oldest {
            Some(term) => {
                debug!("Evicting cached results for {term:?}");
                self.entries.remove(&term);
                true
            }
            None => false,
        }
    }

    /// Drop every entry that is no longer fresh at `now`.
    pub fn purge_expired(&mut self, now: f64) {
        let ttl = self.ttl_ms;
        self.entries.retain(|_, e| now - e.timestamp < ttl);
    }

    pub fn contains(&self, term: &str) -> bool {
        self.entries.contains_key(term)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
