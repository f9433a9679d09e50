//! Error types for the search/filter layer
//!
//! None of these reach UI callers for storage problems; they are logged and
//! absorbed by the stores. `FilterError` is returned where a caller hands in a
//! patch that cannot be applied to its filter type.

use thiserror::Error;

/// Failures of the durable key-value backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Storage is not available in this environment")]
    Unavailable,

    #[error("Failed to read storage key '{0}': {1}")]
    Read(String, String),

    #[error("Failed to write storage key '{0}': {1}")]
    Write(String, String),

    #[error("Failed to remove storage key '{0}': {1}")]
    Remove(String, String),
}

/// Failures turning filter values into or out of their JSON form
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Filters must serialize to a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Failed to serialize filters: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Patch does not fit the filter type: {0}")]
    Patch(#[source] serde_json::Error),

    #[error("Stored filters are not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// A role name outside the portal's closed role set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);
