//! Debounced search sessions backed by a result cache.
//!
//! A session turns settled search terms into [`SearchStep`]s. Empty terms clear
//! the results, fresh cache entries are served without a search, and anything
//! else yields a [`SearchTicket`] for the caller to run its search with. The
//! outcome goes back through [`DebouncedSearch::complete`].
//!
//! Searches in flight are never aborted. Each ticket carries a sequence number
//! and only the latest one may change the visible state; an older response is
//! still cached under its own term but otherwise dropped.

use crate::cache::SearchCache;
use crate::config::SearchConfig;
use crate::debounce::Debouncer;
use crate::utils::error_message;
use futures::future::LocalBoxFuture;
use log::debug;
use std::future::Future;

/// What a search callback resolves to. Errors are display messages.
pub type SearchOutcome<T> = Result<T, String>;

/// Boxed future returned by search callbacks handed to the hook layer.
pub type SearchFuture<T> = LocalBoxFuture<'static, SearchOutcome<T>>;

/// Visible state of a search session.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState<T> {
    pub debounced_term: String,
    pub is_searching: bool,
    pub results: Option<T>,
    pub error: Option<String>,
    /// Whether `results` were served from the cache.
    pub from_cache: bool,
}

impl<T> Default for SearchState<T> {
    fn default() -> Self {
        Self {
            debounced_term: String::new(),
            is_searching: false,
            results: None,
            error: None,
            from_cache: false,
        }
    }
}

/// Permission to run one search; hand it back with the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    term: String,
}

impl SearchTicket {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStep {
    /// The term was empty and results were cleared.
    Cleared,
    /// Fresh cached results were served.
    CacheHit,
    /// The caller must run a search for the ticket's term.
    Fetch(SearchTicket),
}

#[derive(Debug, Clone)]
pub struct DebouncedSearch<T> {
    debounce: Debouncer<String>,
    cache: SearchCache<T>,
    state: SearchState<T>,
    latest: u64,
}

impl<T: Clone> Default for DebouncedSearch<T> {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl<T: Clone> DebouncedSearch<T> {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            debounce: Debouncer::new(String::new(), config.delay_ms),
            cache: SearchCache::new(config.cache_ttl_ms, config.max_cache_entries),
            state: SearchState::default(),
            latest: 0,
        }
    }

    pub fn state(&self) -> &SearchState<T> {
        &self.state
    }

    pub fn cache(&self) -> &SearchCache<T> {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Record a raw keystroke-level term.
    pub fn input(&mut self, term: impl Into<String>, now: f64) {
        self.debounce.push(term.into(), now);
    }

    /// Act on the debounced term once it settles on a new value.
    pub fn poll(&mut self, now: f64) -> Option<SearchStep> {
        let term = self.debounce.take_due(now)?;
        if term == self.state.debounced_term {
            return None;
        }
        Some(self.begin(&term, now))
    }

    /// Start handling a settled term.
    pub fn begin(&mut self, term: &str, now: f64) -> SearchStep {
        self.latest += 1;
        self.state.debounced_term = term.to_string();

        if term.is_empty() {
            self.state.results = None;
            self.state.is_searching = false;
            self.state.from_cache = false;
            return SearchStep::Cleared;
        }

        if let Some(results) = self.cache.get(term, now) {
            debug!("Serving cached results for {term:?}");
            self.state.results = Some(results);
            self.state.is_searching = false;
            self.state.from_cache = true;
            return SearchStep::CacheHit;
        }

        debug!("Cache miss for {term:?}, searching");
        self.state.is_searching = true;
        self.state.error = None;
        SearchStep::Fetch(SearchTicket {
            seq: self.latest,
            term: term.to_string(),
        })
    }

    /// Apply the outcome of a search. Returns `false` when the ticket has
    /// been superseded and the visible state was left alone.
    pub fn complete(&mut self, ticket: SearchTicket, outcome: SearchOutcome<T>, now: f64) -> bool {
        let current = ticket.seq == self.latest;
        match outcome {
            Ok(results) => {
                let visible = current.then(|| results.clone());
                self.cache.insert(ticket.term.clone(), results, now);
                match visible {
                    Some(results) => {
                        self.state.results = Some(results);
                        self.state.from_cache = false;
                    }
                    None => {
                        debug!("Discarding stale results for {:?}", ticket.term);
                        return false;
                    }
                }
            }
            Err(message) => {
                if !current {
                    debug!("Discarding stale error for {:?}", ticket.term);
                    return false;
                }
                self.state.error = Some(error_message(message));
            }
        }
        self.state.is_searching = false;
        true
    }

    /// Begin `term` and, on a cache miss, await `search` and apply its outcome.
    ///
    /// `clock` is read once when the term begins and again when the search
    /// resolves, so a cached entry is stamped with its completion time.
    pub async fn run<C, F, Fut>(&mut self, term: &str, clock: C, search: F) -> SearchStep
    where
        C: Fn() -> f64,
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = SearchOutcome<T>>,
    {
        let step = self.begin(term, clock());
        if let SearchStep::Fetch(ticket) = &step {
            let outcome = search(ticket.term.clone()).await;
            self.complete(ticket.clone(), outcome, clock());
        }
        step
    }
}
