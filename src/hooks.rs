//! Yew hooks over the debounce, search and filter state machines.
//!
//! State lives in `use_mut_ref` cells owned by the calling component, so every
//! mounted component gets its own cache and pending buffer. Timers are
//! `gloo_timers` timeouts; dropping one cancels it, which is how rescheduling
//! and unmount cleanup work.

use crate::batch::DebouncedFilters;
use crate::config::SearchConfig;
use crate::filters::{FilterPatch, FilterStore};
use crate::persistent::PersistentFilters;
use crate::search::{DebouncedSearch, SearchFuture, SearchStep};
use crate::storage::LocalStorage;
use crate::utils::now_ms;
use gloo_timers::callback::Timeout;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

/// Follow `value`, but only after it has stayed unchanged for `delay_ms`.
#[hook]
pub fn use_debounce_value<T>(value: T, delay_ms: u32) -> T
where
    T: Clone + PartialEq + 'static,
{
    let debounced = use_state_eq(|| value.clone());
    {
        let debounced = debounced.clone();
        use_effect_with((value, delay_ms), move |(value, delay_ms)| {
            let value = value.clone();
            let timeout = Timeout::new(*delay_ms, move || debounced.set(value));
            // A newer value or unmount cancels the pending update.
            move || drop(timeout)
        });
    }
    (*debounced).clone()
}

/// State and callbacks of a debounced, cached search.
#[derive(Clone)]
pub struct UseDebouncedSearchHandle<T: Clone + 'static> {
    pub debounced_term: String,
    pub is_searching: bool,
    pub search_results: Option<T>,
    pub error: Option<String>,
    /// Whether `search_results` came from the cache.
    pub from_cache: bool,
    pub clear_cache: Callback<()>,
}

/// Run `on_search` for settled, non-empty terms, serving repeats from a
/// five-minute cache. Responses for superseded terms never reach the state.
#[hook]
pub fn use_debounced_search<T>(
    search_term: String,
    delay_ms: u32,
    on_search: Option<Callback<String, SearchFuture<T>>>,
) -> UseDebouncedSearchHandle<T>
where
    T: Clone + 'static,
{
    let debounced_term = use_debounce_value(search_term, delay_ms);
    let session = use_mut_ref(|| DebouncedSearch::<T>::new(SearchConfig::with_delay(delay_ms)));
    let rerender = use_force_update();

    {
        let session = session.clone();
        let rerender = rerender.clone();
        use_effect_with(debounced_term.clone(), move |term| {
            let Some(on_search) = on_search else {
                return;
            };
            let step = session.borrow_mut().begin(term, now_ms());
            rerender.force_update();

            if let SearchStep::Fetch(ticket) = step {
                let request = on_search.emit(ticket.term().to_string());
                wasm_bindgen_futures::spawn_local(async move {
                    let outcome = request.await;
                    let applied = session.borrow_mut().complete(ticket, outcome, now_ms());
                    if applied {
                        rerender.force_update();
                    }
                });
            }
        });
    }

    let clear_cache = {
        let session = session.clone();
        Callback::from(move |_| session.borrow_mut().clear_cache())
    };

    let state = session.borrow().state().clone();
    UseDebouncedSearchHandle {
        debounced_term,
        is_searching: state.is_searching,
        search_results: state.results,
        error: state.error,
        from_cache: state.from_cache,
        clear_cache,
    }
}

/// Debounced view of caller-owned filters plus batched updates.
#[derive(Clone)]
pub struct UseDebouncedFiltersHandle<T: Clone + 'static> {
    pub debounced_filters: T,
    pub is_updating: bool,
    pub batch_update_filters: Callback<FilterPatch>,
}

fn cancel_on_unmount(timer: &Rc<RefCell<Option<Timeout>>>) -> impl FnOnce() + 'static {
    let timer = timer.clone();
    move || {
        timer.borrow_mut().take();
    }
}

/// Debounce caller-owned `filters` and batch patches on top of them.
///
/// `on_filters_change` receives the filters whenever they settle on a new
/// value, and the latest filters with the merged patch when a batch is
/// released.
#[hook]
pub fn use_debounced_filters<T>(
    filters: T,
    delay_ms: u32,
    on_filters_change: Option<Callback<T>>,
) -> UseDebouncedFiltersHandle<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
{
    let core = use_mut_ref(|| DebouncedFilters::new(filters.clone(), delay_ms));
    let settle_timer = use_mut_ref(|| None::<Timeout>);
    let batch_timer = use_mut_ref(|| None::<Timeout>);
    let rerender = use_force_update();

    core.borrow_mut().observe(filters.clone(), now_ms());

    {
        let teardown = cancel_on_unmount(&settle_timer);
        use_effect_with((), move |_| teardown);
    }
    {
        let teardown = cancel_on_unmount(&batch_timer);
        use_effect_with((), move |_| teardown);
    }

    {
        let core = core.clone();
        let on_filters_change = on_filters_change.clone();
        let rerender = rerender.clone();
        use_effect_with(filters, move |_| {
            if !core.borrow().is_settling() {
                // Back on the settled value; nothing left to announce.
                settle_timer.borrow_mut().take();
                return;
            }
            let handle = Timeout::new(delay_ms, move || {
                let settled = core.borrow_mut().flush_settled();
                if let (Some(settled), Some(callback)) = (settled, &on_filters_change) {
                    callback.emit(settled);
                }
                rerender.force_update();
            });
            // Replacing the handle cancels the previous timer.
            *settle_timer.borrow_mut() = Some(handle);
        });
    }

    let batch_update_filters = {
        let core = core.clone();
        Callback::from(move |patch: FilterPatch| {
            core.borrow_mut().batch_update(patch, now_ms());
            rerender.force_update();

            let core = core.clone();
            let on_filters_change = on_filters_change.clone();
            let rerender = rerender.clone();
            let handle = Timeout::new(delay_ms, move || {
                let released = core.borrow_mut().flush_batch();
                if let (Some(merged), Some(callback)) = (released, &on_filters_change) {
                    callback.emit(merged);
                }
                rerender.force_update();
            });
            *batch_timer.borrow_mut() = Some(handle);
        })
    };

    let (debounced_filters, is_updating) = {
        let core = core.borrow();
        (core.debounced().clone(), core.is_updating())
    };
    UseDebouncedFiltersHandle {
        debounced_filters,
        is_updating,
        batch_update_filters,
    }
}

/// Filters mirrored into `localStorage`.
#[derive(Clone)]
pub struct UseFilterPersistenceHandle<T: Clone + 'static> {
    pub filters: T,
    pub set_filters: Callback<T>,
    pub update_filters: Callback<FilterPatch>,
    pub clear_persisted_filters: Callback<()>,
}

#[hook]
pub fn use_filter_persistence<T>(storage_key: String, default_filters: T) -> UseFilterPersistenceHandle<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
{
    let store = use_mut_ref(|| FilterStore::open(LocalStorage::new(), storage_key, default_filters));
    let rerender = use_force_update();

    let set_filters = {
        let store = store.clone();
        let rerender = rerender.clone();
        Callback::from(move |filters: T| {
            store.borrow_mut().set_filters(filters);
            rerender.force_update();
        })
    };

    let update_filters = {
        let store = store.clone();
        let rerender = rerender.clone();
        Callback::from(move |patch: FilterPatch| {
            let result = store.borrow_mut().update_filters(&patch);
            match result {
                Ok(()) => rerender.force_update(),
                Err(e) => warn!("Ignoring filter update: {e}"),
            }
        })
    };

    let clear_persisted_filters = {
        let store = store.clone();
        Callback::from(move |_| {
            store.borrow_mut().clear_persisted_filters();
            rerender.force_update();
        })
    };

    let filters = store.borrow().filters().clone();
    UseFilterPersistenceHandle {
        filters,
        set_filters,
        update_filters,
        clear_persisted_filters,
    }
}

/// Persisted filters with optimistic, debounced batch updates.
#[derive(Clone)]
pub struct UsePersistentDebouncedFiltersHandle<T: Clone + 'static> {
    /// Committed filters with pending updates applied.
    pub filters: T,
    pub batch_update_filters: Callback<FilterPatch>,
    pub clear_all_filters: Callback<()>,
    /// Commit pending updates now. Call it from teardown code that must not
    /// lose the last change; unmounting alone drops pending updates.
    pub flush: Callback<()>,
    pub is_updating: bool,
    pub has_persisted_state: bool,
}

#[hook]
pub fn use_persistent_debounced_filters<T>(
    storage_key: String,
    default_filters: T,
    debounce_ms: u32,
) -> UsePersistentDebouncedFiltersHandle<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + 'static,
{
    let session = use_mut_ref(|| {
        PersistentFilters::open(LocalStorage::new(), storage_key, default_filters, debounce_ms)
    });
    let timer = use_mut_ref(|| None::<Timeout>);
    let rerender = use_force_update();

    {
        let teardown = cancel_on_unmount(&timer);
        use_effect_with((), move |_| teardown);
    }

    let batch_update_filters = {
        let session = session.clone();
        let timer = timer.clone();
        let rerender = rerender.clone();
        Callback::from(move |patch: FilterPatch| {
            session.borrow_mut().batch_update_filters(patch, now_ms());
            rerender.force_update();

            let session = session.clone();
            let rerender = rerender.clone();
            let handle = Timeout::new(debounce_ms, move || {
                session.borrow_mut().flush();
                rerender.force_update();
            });
            *timer.borrow_mut() = Some(handle);
        })
    };

    let clear_all_filters = {
        let session = session.clone();
        let timer = timer.clone();
        let rerender = rerender.clone();
        Callback::from(move |_| {
            timer.borrow_mut().take();
            session.borrow_mut().clear_all_filters();
            rerender.force_update();
        })
    };

    let flush = {
        let session = session.clone();
        Callback::from(move |_| {
            timer.borrow_mut().take();
            let committed = session.borrow_mut().flush();
            if committed {
                rerender.force_update();
            }
        })
    };

    let (filters, is_updating, has_persisted_state) = {
        let session = session.borrow();
        (
            session.filters(),
            session.is_updating(),
            session.has_persisted_state(),
        )
    };

    UsePersistentDebouncedFiltersHandle {
        filters,
        batch_update_filters,
        clear_all_filters,
        flush,
        is_updating,
        has_persisted_state,
    }
}
