//! JSON-file backed preference store.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::{CHANGE_CAPACITY, Error, PrefsStore, Result};

/// Preferences persisted as a single JSON object.
///
/// The file is read once on [`JsonFileStore::open`] and cached. Writes build
/// the new object on a copy, rewrite the whole file through a temporary
/// sibling and a rename, and only then replace the cache and notify
/// subscribers. A failed write leaves the cache untouched. Edits made by other processes
/// are picked up with [`JsonFileStore::reload`].
pub struct JsonFileStore {
    /// Backing file.
    path: PathBuf,
    /// Cached file contents.
    values: Mutex<Map<String, Value>>,
    /// Change notifications.
    events: broadcast::Sender<String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = read_object(&path)?;
        debug!(path = %path.display(), keys = values.len(), "prefs opened");
        let (events, _) = broadcast::channel(CHANGE_CAPACITY);
        Ok(Self {
            path,
            values: Mutex::new(values),
            events,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the backing file and notify subscribers of every key whose
    /// value changed. Returns the changed keys.
    pub fn reload(&self) -> Result<Vec<String>> {
        let fresh = read_object(&self.path)?;
        let changed = {
            let mut values = self.values.lock();
            let mut changed: Vec<String> = fresh
                .iter()
                .filter(|(k, v)| values.get(*k) != Some(*v))
                .map(|(k, _)| k.clone())
                .collect();
            changed.extend(values.keys().filter(|k| !fresh.contains_key(*k)).cloned());
            *values = fresh;
            changed
        };
        for key in &changed {
            trace!(key, "prefs changed on disk");
            let _ = self.events.send(key.clone());
        }
        Ok(changed)
    }

    /// Apply `f` to a copy of the cache, persist it, then commit it.
    fn write_with(&self, key: &str, f: impl FnOnce(&mut Map<String, Value>) -> bool) -> Result<()> {
        {
            let mut values = self.values.lock();
            let mut next = values.clone();
            if !f(&mut next) {
                return Ok(());
            }
            write_object(&self.path, &next)?;
            *values = next;
        }
        let _ = self.events.send(key.to_string());
        Ok(())
    }
}

impl PrefsStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.write_with(key, |m| {
            m.insert(key.to_string(), value);
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.write_with(key, |m| m.remove(key).is_some())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.events.subscribe()
    }
}

/// Read `path` as a JSON object; a missing file yields an empty object.
fn read_object(path: &Path) -> Result<Map<String, Value>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(Error::Json {
            path: path.to_path_buf(),
            message: "top-level value is not an object".to_string(),
        }),
        Err(e) => Err(Error::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Write `values` to `path` via a temporary file and rename.
fn write_object(path: &Path, values: &Map<String, Value>) -> Result<()> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let body = serde_json::to_vec_pretty(values).map_err(|e| Error::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, body).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}
