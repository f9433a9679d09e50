//! Debounced, cached and persisted search/filter state for the Emirati
//! Gateway portal's list pages (job search, training catalog, scholarships,
//! summer camps).
//!
//! The state machines in [`debounce`], [`cache`], [`search`], [`filters`],
//! [`batch`] and [`persistent`] take the current time as an argument and do
//! no I/O beyond the [`storage::FilterStorage`] seam. [`hooks`] wires them to
//! Yew components with real timers and `localStorage`.

pub mod batch;
pub mod cache;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filters;
pub mod hooks;
pub mod persistent;
pub mod roles;
pub mod search;
pub mod storage;
pub mod utils;

pub use batch::{DebouncedFilters, FilterBatch};
pub use cache::SearchCache;
pub use config::SearchConfig;
pub use debounce::Debouncer;
pub use error::{FilterError, StorageError, UnknownRole};
pub use filters::{apply_patch, non_default_subset, FilterPatch, FilterStore};
pub use hooks::{
    use_debounce_value,
    use_debounced_filters,
    use_debounced_search,
    use_filter_persistence,
    use_persistent_debounced_filters,
};
pub use persistent::{CommitState, PersistentFilters};
pub use roles::{Role, RoleIcon};
pub use search::{DebouncedSearch, SearchFuture, SearchOutcome, SearchState, SearchStep, SearchTicket};
pub use storage::{FilterStorage, LocalStorage, MemoryStorage};
