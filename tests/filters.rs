use gateway_search::{
    FilterPatch, FilterStorage, FilterStore, MemoryStorage, PersistentFilters, StorageError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ScholarshipFilters {
    category: String,
    location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Counters {
    a: u32,
    b: u32,
}

const KEY: &str = "filters:student:scholarships";

fn stored(storage: &MemoryStorage, key: &str) -> Option<Value> {
    storage
        .get(key)
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).unwrap())
}

#[test]
fn only_non_default_keys_are_persisted() {
    let storage = MemoryStorage::new();
    let mut store = FilterStore::open(storage.clone(), KEY, ScholarshipFilters::default());

    store
        .update_filters(&FilterPatch::new().set("category", "tech"))
        .unwrap();
    assert_eq!(stored(&storage, KEY), Some(json!({"category": "tech"})));
    assert_eq!(storage.get(KEY).unwrap().as_deref(), Some(r#"{"category":"tech"}"#));

    store
        .update_filters(&FilterPatch::new().set("category", ""))
        .unwrap();
    assert_eq!(storage.get(KEY).unwrap(), None);
    assert!(!store.has_persisted_state());
}

#[test]
fn fresh_instance_reloads_the_same_filters() {
    let storage = MemoryStorage::new();
    let mut first = FilterStore::open(storage.clone(), KEY, ScholarshipFilters::default());
    first
        .update_filters(&FilterPatch::new().set("category", "medicine").set("location", "Al Ain"))
        .unwrap();

    let second = FilterStore::open(storage.clone(), KEY, ScholarshipFilters::default());
    assert_eq!(second.filters(), first.filters());
    assert_eq!(second.filters().location, "Al Ain");
}

#[test]
fn stored_values_win_over_defaults() {
    let storage = MemoryStorage::new();
    storage.set(KEY, r#"{"location":"Fujairah"}"#).unwrap();
    let defaults = ScholarshipFilters {
        category: "engineering".into(),
        location: "Dubai".into(),
    };

    let store = FilterStore::open(storage, KEY, defaults);
    assert_eq!(store.filters().category, "engineering");
    assert_eq!(store.filters().location, "Fujairah");
}

#[test]
fn batched_updates_commit_in_one_write() {
    let storage = MemoryStorage::new();
    let mut session = PersistentFilters::open(storage.clone(), "counters", Counters::default(), 300);

    session.batch_update_filters(FilterPatch::new().set("a", 1), 0.0);
    session.batch_update_filters(FilterPatch::new().set("b", 2), 100.0);

    // Optimistic view before anything is written.
    assert_eq!(session.filters(), Counters { a: 1, b: 2 });
    assert_eq!(session.committed(), &Counters::default());
    assert!(session.is_updating());
    assert_eq!(storage.write_count(), 0);

    assert!(!session.poll(399.0));
    assert!(session.poll(400.0));

    assert_eq!(storage.write_count(), 1);
    assert_eq!(stored(&storage, "counters"), Some(json!({"a": 1, "b": 2})));
    assert!(!session.is_updating());
    assert!(session.has_persisted_state());
}

#[test]
fn clear_discards_pending_and_removes_entry() {
    let storage = MemoryStorage::new();
    let mut session = PersistentFilters::open(storage.clone(), KEY, ScholarshipFilters::default(), 300);

    session.batch_update_filters(FilterPatch::new().set("category", "law"), 0.0);
    session.flush();
    assert!(session.has_persisted_state());

    session.batch_update_filters(FilterPatch::new().set("location", "Ras Al Khaimah"), 500.0);
    session.clear_all_filters();

    assert_eq!(session.filters(), ScholarshipFilters::default());
    assert!(!session.is_updating());
    assert!(!session.has_persisted_state());
    assert_eq!(storage.get(KEY).unwrap(), None);

    // The discarded update never lands.
    assert!(!session.poll(10_000.0));
    assert_eq!(storage.get(KEY).unwrap(), None);
}

#[test]
fn flush_commits_before_the_window_ends() {
    let storage = MemoryStorage::new();
    let mut session = PersistentFilters::open(storage.clone(), KEY, ScholarshipFilters::default(), 300);
    session.batch_update_filters(FilterPatch::new().set("location", "Sharjah"), 0.0);

    assert!(session.flush());
    assert_eq!(stored(&storage, KEY), Some(json!({"location": "Sharjah"})));

    let reopened = PersistentFilters::open(storage, KEY, ScholarshipFilters::default(), 300);
    assert_eq!(reopened.filters().location, "Sharjah");
}

/// Storage that refuses every operation, like a browser with storage disabled.
struct DisabledStorage;

impl FilterStorage for DisabledStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write(key.to_string(), "QuotaExceededError".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[test]
fn storage_failures_keep_filters_in_memory() {
    let mut session = PersistentFilters::open(DisabledStorage, KEY, ScholarshipFilters::default(), 300);
    session.batch_update_filters(FilterPatch::new().set("category", "arts"), 0.0);
    assert!(session.poll(300.0));

    assert_eq!(session.committed().category, "arts");
    assert!(!session.has_persisted_state());

    session.clear_all_filters();
    assert_eq!(session.filters(), ScholarshipFilters::default());
}
