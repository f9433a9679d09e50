//! Filter objects, partial updates and their persisted form.
//!
//! Filters are any serde type that serializes to a JSON object. Only the keys
//! that differ from the defaults and are not blank are written to storage; when
//! nothing remains the storage entry is removed instead of holding `{}`.

use crate::error::{FilterError, StorageError};
use crate::storage::FilterStorage;
use crate::utils::is_blank;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A shallow overlay of filter keys onto a filter object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPatch(Map<String, Value>);

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterPatch::insert`].
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Merge `other` on top of this patch; keys in `other` win.
    pub fn merge(&mut self, other: FilterPatch) {
        self.0.extend(other.0);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// `base` with this patch applied.
    pub fn apply_to<T>(&self, base: &T) -> Result<T, FilterError>
    where
        T: Serialize + DeserializeOwned,
    {
        apply_patch(base, self)
    }
}

impl From<Map<String, Value>> for FilterPatch {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn to_object<T: Serialize>(filters: &T) -> Result<Map<String, Value>, FilterError> {
    match serde_json::to_value(filters).map_err(FilterError::Serialize)? {
        Value::Object(map) => Ok(map),
        other => Err(FilterError::NotAnObject(value_kind(&other))),
    }
}

/// Shallow-merge `patch` onto `base` and read the result back as `T`.
pub fn apply_patch<T>(base: &T, patch: &FilterPatch) -> Result<T, FilterError>
where
    T: Serialize + DeserializeOwned,
{
    let mut map = to_object(base)?;
    for (key, value) in patch.iter() {
        map.insert(key.clone(), value.clone());
    }
    serde_json::from_value(Value::Object(map)).map_err(FilterError::Patch)
}

/// Keys of `filters` that differ from `defaults` and are not blank.
pub fn non_default_subset<T: Serialize>(filters: &T, defaults: &T) -> Result<FilterPatch, FilterError> {
    let current = to_object(filters)?;
    let defaults = to_object(defaults)?;
    let subset = current
        .into_iter()
        .filter(|(key, value)| !is_blank(value) && defaults.get(key) != Some(value))
        .collect::<Map<_, _>>();
    Ok(FilterPatch(subset))
}

fn read_stored(storage: &impl FilterStorage, key: &str) -> Result<Option<FilterPatch>, StorageError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str::<FilterPatch>(&raw) {
        Ok(patch) => Ok(Some(patch)),
        Err(e) => {
            warn!("Ignoring stored filters under '{key}': {}", FilterError::Malformed(e));
            Ok(None)
        }
    }
}

/// Whether a non-empty persisted entry exists under `key`.
pub fn has_persisted_entry(storage: &impl FilterStorage, key: &str) -> bool {
    match read_stored(storage, key) {
        Ok(Some(patch)) => !patch.is_empty(),
        Ok(None) => false,
        Err(e) => {
            warn!("{e}");
            false
        }
    }
}

/// In-memory filters kept in sync with one storage entry.
#[derive(Debug)]
pub struct FilterStore<T, S> {
    storage: S,
    key: String,
    defaults: T,
    filters: T,
}

impl<T, S> FilterStore<T, S>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq,
    S: FilterStorage,
{
    /// Hydrate from `storage` under `key`, falling back to `defaults`.
    pub fn open(storage: S, key: impl Into<String>, defaults: T) -> Self {
        let key = key.into();
        let filters = match read_stored(&storage, &key) {
            Ok(Some(stored)) => match apply_patch(&defaults, &stored) {
                Ok(merged) => {
                    debug!("Restored {} persisted filter(s) from '{key}'", stored.len());
                    merged
                }
                Err(e) => {
                    warn!("Stored filters under '{key}' do not fit, using defaults: {e}");
                    defaults.clone()
                }
            },
            Ok(None) => defaults.clone(),
            Err(e) => {
                warn!("Failed to load persisted filters, using defaults: {e}");
                defaults.clone()
            }
        };

        let store = Self {
            storage,
            key,
            defaults,
            filters,
        };
        store.persist();
        store
    }

    pub fn filters(&self) -> &T {
        &self.filters
    }

    pub fn defaults(&self) -> &T {
        &self.defaults
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replace the filters wholesale.
    pub fn set_filters(&mut self, filters: T) {
        if filters == self.filters {
            return;
        }
        self.filters = filters;
        self.persist();
    }

    /// Shallow-merge `patch` into the current filters.
    ///
    /// A patch whose values do not fit `T` leaves the filters untouched.
    pub fn update_filters(&mut self, patch: &FilterPatch) -> Result<(), FilterError> {
        let updated = apply_patch(&self.filters, patch)?;
        self.set_filters(updated);
        Ok(())
    }

    /// Reset to defaults and delete the storage entry.
    pub fn clear_persisted_filters(&mut self) {
        self.filters = self.defaults.clone();
        if let Err(e) = self.storage.remove(&self.key) {
            warn!("Failed to clear persisted filters: {e}");
        }
    }

    pub fn has_persisted_state(&self) -> bool {
        has_persisted_entry(&self.storage, &self.key)
    }

    fn persist(&self) {
        let subset = match non_default_subset(&self.filters, &self.defaults) {
            Ok(subset) => subset,
            Err(e) => {
                warn!("Failed to compute filters to persist: {e}");
                return;
            }
        };

        let result = if subset.is_empty() {
            self.storage.remove(&self.key)
        } else {
            match serde_json::to_string(&subset) {
                Ok(json) => self.storage.set(&self.key, &json),
                Err(e) => {
                    warn!("Failed to serialize filters: {e}");
                    return;
                }
            }
        };

        if let Err(e) = result {
            warn!("Failed to persist filters, keeping them in memory only: {e}");
        }
    }
}
