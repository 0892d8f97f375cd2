//! Typed error hierarchy for the variation engine.
//!
//! Two enums cover the two failure domains the library owns:
//! - `StoreError`: keyed TTL store reads and writes
//! - `ConfigError`: engine configuration that cannot produce a usable engine
//!
//! Rewrite-callback failures are never wrapped here; they reach the caller in
//! the callback's own error type.

use thiserror::Error;

/// Errors from a [`KeyValueStore`](crate::store::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read state file at {path}: {source}")]
    ReadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write state file at {path}: {source}")]
    WriteFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt state file at {path}: {source}")]
    Corrupt {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Errors that make a configuration unusable for building an engine.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Default context '{context}' has no angle pool")]
    MissingDefaultPool { context: String },

    #[error("Similarity threshold must be within 0..=100, got {value}")]
    ThresholdOutOfRange { value: f64 },

    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },
}
