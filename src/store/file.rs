//! JSON-file TTL store used by the CLI.
//!
//! The whole map is read and rewritten on every mutation. Expired entries are
//! dropped whenever the file is rewritten. A file that no longer parses is moved
//! aside to `<name>.corrupt` on the next mutation and the store starts empty.

use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

use super::{KeyValueStore, StoredEntry};
use crate::errors::StoreError;

type EntryMap = BTreeMap<String, StoredEntry>;

pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<EntryMap, StoreError> {
        if !self.path.exists() {
            return Ok(EntryMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::ReadFailed {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(EntryMap::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, entries: &EntryMap) -> Result<(), StoreError> {
        let write_err = |source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Encode {
            key: self.path.display().to_string(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)
    }

    /// Move an unparseable state file out of the way, keeping it for inspection.
    fn quarantine(&self) -> Result<PathBuf, StoreError> {
        let aside = self.path.with_extension("json.corrupt");
        fs::rename(&self.path, &aside).map_err(|source| StoreError::WriteFailed {
            path: aside.clone(),
            source,
        })?;
        Ok(aside)
    }

    fn mutate<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut EntryMap),
    {
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(e @ StoreError::Corrupt { .. }) => {
                let aside = self.quarantine()?;
                warn!(
                    error = %e,
                    moved_to = %aside.display(),
                    "state file unreadable, starting empty"
                );
                EntryMap::new()
            }
            Err(e) => return Err(e),
        };
        let now = Utc::now();
        entries.retain(|_, entry| !entry.is_expired(now));
        f(&mut entries);
        self.save(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let entries = self.load()?;
        let now = Utc::now();
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), StoredEntry::new(value, ttl));
        })
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }
}
