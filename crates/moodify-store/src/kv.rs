//! Typed key/value access with fail-soft semantics.
//!
//! [`KvStore`] sits on top of any [`KeyValueBackend`] and exposes the three
//! operations the application relies on:
//!
//! - [`KvStore::load`] never fails. A missing, unreadable or unparsable entry
//!   yields the caller's default. When both the default and the stored value
//!   are JSON objects, the stored fields are laid over the default so fields
//!   added after the blob was written still get a value.
//! - [`KvStore::save`] never fails. Errors are logged and the caller keeps its
//!   in-memory copy as the source of truth.
//! - [`KvStore::remove`] is idempotent.
//!
//! The `try_*` variants surface errors for callers that must react to them.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::error::{Result, StoreError};

/// Raw string storage keyed by application key.
pub trait KeyValueBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Cloneable handle to a shared backend.
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<Mutex<Box<dyn KeyValueBackend>>>,
}

impl KvStore {
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Arc::new(Mutex::new(Box::new(backend))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn KeyValueBackend>>> {
        self.backend.lock().map_err(|_| StoreError::LockPoisoned)
    }

    pub fn try_load_raw(&self, key: &str) -> Result<Option<String>> {
        self.lock()?.get(key)
    }

    pub fn try_save_raw(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.set(key, value)
    }

    pub fn try_remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key)
    }

    /// Read-modify-write of a JSON entry under a single lock acquisition.
    ///
    /// Returns `Ok(None)` without writing when the key is absent. Nothing is
    /// written if the blob does not parse or `f` fails.
    pub fn update_json<R, F>(&self, key: &str, f: F) -> Result<Option<R>>
    where
        F: FnOnce(&mut Value) -> Result<R>,
    {
        let mut backend = self.lock()?;
        let Some(raw) = backend.get(key)? else {
            return Ok(None);
        };

        let mut value: Value = serde_json::from_str(&raw)?;
        let out = f(&mut value)?;
        backend.set(key, &serde_json::to_string(&value)?)?;
        Ok(Some(out))
    }

    /// Load `key`, falling back to `default` on any problem.
    pub fn load<T>(&self, key: &str, default: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        let raw = match self.try_load_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                error!(key, error = %e, "failed to read entry, using default");
                return default;
            }
        };

        let stored: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "stored entry is not valid JSON, using default");
                return default;
            }
        };

        let merged = match serde_json::to_value(&default) {
            Ok(base) => merge_onto(base, stored),
            Err(e) => {
                warn!(key, error = %e, "default is not representable as JSON");
                return default;
            }
        };

        match serde_json::from_value(merged) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "stored entry does not match expected shape, using default");
                default
            }
        }
    }

    /// Persist `value` under `key`. Failures are logged, never returned.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                error!(key, error = %e, "failed to serialize entry");
                return;
            }
        };
        if let Err(e) = self.try_save_raw(key, &json) {
            error!(key, error = %e, "failed to save entry");
        }
    }

    /// Delete `key`. Failures are logged, never returned.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            error!(key, error = %e, "failed to remove entry");
        }
    }
}

/// Shallow merge: stored object fields override the default's, default-only
/// fields survive. Anything other than object-onto-object returns `stored`.
pub fn merge_onto(default: Value, stored: Value) -> Value {
    match (default, stored) {
        (Value::Object(mut base), Value::Object(over)) => {
            base.extend(over);
            Value::Object(base)
        }
        (_, stored) => stored,
    }
}
