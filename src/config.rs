//! Application-level configuration constants.

use serde::Deserialize;

// Debounce behavior
pub const DEBOUNCE_MS: u32 = 300;

// Search result cache
pub const CACHE_DURATION_MS: f64 = 5.0 * 60.0 * 1000.0;
pub const MAX_CACHE_ENTRIES: usize = 50;

// Fallback shown when a search callback fails without a message
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed";

// Prefix for role-scoped filter storage keys
pub const FILTER_KEY_PREFIX: &str = "filters";

/// Tunables for a debounced search session.
///
/// Hosts that ship settings as JSON can deserialize this directly; missing
/// fields fall back to the constants above.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub delay_ms: u32,
    pub cache_ttl_ms: f64,
    pub max_cache_entries: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEBOUNCE_MS,
            cache_ttl_ms: CACHE_DURATION_MS,
            max_cache_entries: MAX_CACHE_ENTRIES,
        }
    }
}

impl SearchConfig {
    pub fn with_delay(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            ..Self::default()
        }
    }
}
