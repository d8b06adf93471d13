//! String key-value persistence
//!
//! The browser build stores values in `window.localStorage`; tests and the
//! native demo use [`MemoryStore`]. Failures are logged and otherwise ignored:
//! losing a best score is never worth interrupting a session.

use std::collections::HashMap;

/// Minimal string key-value store
pub trait KeyValueStore {
    /// Stored value for `key`, if any
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str);
}

/// Volatile store backed by a `HashMap`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entries`
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// `window.localStorage`
///
/// When storage is unavailable (private browsing, sandboxed iframe) every
/// read misses and writes are dropped.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable, progress will not be saved");
        }
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if storage.set_item(key, value).is_err() {
                log::warn!("Failed to write '{}' to LocalStorage", key);
            }
        }
    }
}
