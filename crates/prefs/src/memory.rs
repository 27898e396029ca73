//! In-memory preference store for tests and ephemeral sessions.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::{CHANGE_CAPACITY, Error, PrefsStore, Result};

/// A [`PrefsStore`] that keeps everything in memory.
///
/// `set_fail_writes(true)` makes every subsequent `set`/`remove` fail with
/// [`Error::Unavailable`] without touching the stored values.
pub struct MemoryStore {
    /// Stored values.
    values: Mutex<HashMap<String, Value>>,
    /// Change notifications.
    events: broadcast::Sender<String>,
    /// Write-failure injection.
    fail_writes: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            values: Mutex::new(HashMap::new()),
            events,
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make writes fail (or succeed again).
    pub fn set_fail_writes(&self, v: bool) {
        self.fail_writes.store(v, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Unavailable);
        }
        Ok(())
    }

    fn notify(&self, key: &str) {
        // No receivers is fine.
        let _ = self.events.send(key.to_string());
    }
}

impl PrefsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.check_writable()?;
        self.values.lock().insert(key.to_string(), value);
        self.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        if self.values.lock().remove(key).is_some() {
            self.notify(key);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.events.subscribe()
    }
}
