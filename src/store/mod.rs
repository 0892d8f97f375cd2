//! Keyed TTL store backing rotation counters and batch history.
//!
//! The engine only needs three capabilities from durable storage: read a key,
//! write a key with an expiry, and delete a key. Anything that offers those can
//! back a [`VariationEngine`](crate::variation::VariationEngine):
//!
//! - [`MemoryStore`] keeps entries in-process (tests, embedding callers)
//! - [`FileStore`] keeps entries in a JSON file so state survives across CLI runs
//!
//! Neither backend offers read-modify-write atomicity. Two callers that read
//! the same counter concurrently can both write `counter + 1`.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::StoreError;

/// Key prefix for per-context rotation counters.
pub const ANGLE_KEY_PREFIX: &str = "myls_angle_";

/// Key prefix for per-context batch history.
pub const BATCH_KEY_PREFIX: &str = "myls_batch_";

/// Storage key holding the rotation counter for `context`.
pub fn angle_key(context: &str) -> String {
    format!("{}{}", ANGLE_KEY_PREFIX, context)
}

/// Storage key holding the fingerprint history for `context`.
pub fn batch_key(context: &str) -> String {
    format!("{}{}", BATCH_KEY_PREFIX, context)
}

/// A key-value store whose entries expire.
pub trait KeyValueStore {
    /// Read a live entry. Expired and missing keys both yield `None`.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write `value` under `key`, replacing any previous entry and its expiry.
    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError>;

    /// Remove `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        (**self).set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        (**self).set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// A stored value together with the instant it stops being visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    pub value: Value,
    pub expires_at: DateTime<Utc>,
}

impl StoredEntry {
    pub fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: expiry_from_now(ttl),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Absolute expiry for a TTL starting now. TTLs too large for chrono saturate.
fn expiry_from_now(ttl: Duration) -> DateTime<Utc> {
    let now = Utc::now();
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_prefixed_per_context() {
        assert_eq!(angle_key("meta_title"), "myls_angle_meta_title");
        assert_eq!(batch_key("meta_title"), "myls_batch_meta_title");
        assert_ne!(angle_key("faq"), batch_key("faq"));
    }

    #[test]
    fn test_zero_ttl_entry_is_expired() {
        let entry = StoredEntry::new(Value::from(1), Duration::ZERO);
        assert!(entry.is_expired(Utc::now()));
    }

    #[test]
    fn test_hour_ttl_entry_is_live() {
        let entry = StoredEntry::new(Value::from(1), Duration::from_secs(3600));
        assert!(!entry.is_expired(Utc::now()));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = StoredEntry::new(Value::Null, Duration::from_secs(u64::MAX));
        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_reference_and_arc_delegate() {
        let store = Arc::new(MemoryStore::new());
        let by_ref: &MemoryStore = &store;
        by_ref
            .set("k", Value::from("v"), Duration::from_secs(60))
            .unwrap();
        assert_eq!(store.get("k").unwrap(), Some(Value::from("v")));
        store.delete("k").unwrap();
        assert_eq!(by_ref.get("k").unwrap(), None);
    }
}
