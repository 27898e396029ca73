//! Persisted preferences for notchdesk.
//!
//! A [`PrefsStore`] is a flat map from string keys to JSON values. Every
//! successful write is made durable before the store broadcasts the changed
//! key to subscribers, so a subscriber that reads the key after being
//! notified always sees the new value.
//!
//! Two implementations are provided:
//! - [`JsonFileStore`]: a single JSON object on disk, written atomically.
//! - [`MemoryStore`]: an in-process map used by tests, with write-failure
//!   injection.

use std::{
    env,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::broadcast;

mod error;
mod file;
mod memory;

pub use error::{Error, Result};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Capacity of the change-notification channel.
pub(crate) const CHANGE_CAPACITY: usize = 64;

/// Key/value preference storage with change notification.
pub trait PrefsStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Subscribe to change notifications. Each message is the changed key.
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

/// Typed accessors layered over any [`PrefsStore`].
pub trait PrefsExt: PrefsStore {
    /// Read and deserialize `key`.
    fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(v) => serde_json::from_value(v).map(Some).map_err(|e| Error::Type {
                key: key.to_string(),
                message: e.to_string(),
            }),
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it under `key`.
    fn set_typed<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let v = serde_json::to_value(value).map_err(|e| Error::Type {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set(key, v)
    }
}

impl<S: PrefsStore + ?Sized> PrefsExt for S {}

/// Default location of the preferences file: `~/.notchdesk/prefs.json`.
pub fn default_prefs_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".notchdesk");
    p.push("prefs.json");
    p
}

/// Resolve the preferences path, preferring an explicit override.
pub fn resolve_prefs_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(default_prefs_path, |p| p.to_path_buf())
}
