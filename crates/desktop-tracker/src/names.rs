//! Registry of user-assigned desktop names.
//!
//! Names are persisted under [`NAMES_KEY`] as a JSON object mapping the
//! decimal Space id to the name. Keys are always handled in lexicographic
//! string order: `"10"` sorts before `"2"`. Displays built on the original
//! data rely on that order, so it is kept rather than switched to numeric.

use std::collections::BTreeMap;

use desktop_ids::SpaceId;
use prefs::PrefsStore;
use serde_json::{Map, Value};
use tracing::warn;

use crate::{Error, Result};

/// Preference key holding the name map.
pub const NAMES_KEY: &str = "desktopNames";

/// A named Space as listed by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    /// Space identifier.
    pub space: SpaceId,
    /// User-assigned name; never empty.
    pub name: String,
}

/// In-memory mapping from Space to user-assigned name.
///
/// Invariants: every key is the canonical decimal form of a non-zero `u64`
/// and every name is non-empty. Iteration is in key string order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopNames {
    /// Entries keyed by [`SpaceId::key`].
    entries: BTreeMap<String, DesktopEntry>,
}

impl DesktopNames {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a persisted value, skipping invalid entries.
    pub fn from_value(value: &Value) -> Self {
        let mut names = Self::new();
        let Some(obj) = value.as_object() else {
            warn!("ignoring {}: expected an object", NAMES_KEY);
            return names;
        };
        for (key, v) in obj {
            let space = match key.parse::<SpaceId>() {
                Ok(s) if !s.is_unknown() => s,
                Ok(_) => {
                    warn!(key, "skipping desktop name for reserved space id");
                    continue;
                }
                Err(e) => {
                    warn!(key, error = %e, "skipping desktop name");
                    continue;
                }
            };
            match v.as_str() {
                Some(name) if !name.is_empty() => {
                    names.entries.insert(
                        key.clone(),
                        DesktopEntry {
                            space,
                            name: name.to_string(),
                        },
                    );
                }
                _ => warn!(key, "skipping empty or non-string desktop name"),
            }
        }
        names
    }

    /// Persisted form of the registry.
    pub fn to_value(&self) -> Value {
        let obj: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), Value::String(e.name.clone())))
            .collect();
        Value::Object(obj)
    }

    /// Load the registry from `store`. A missing key is an empty registry.
    pub fn load(store: &dyn PrefsStore) -> prefs::Result<Self> {
        Ok(store
            .get(NAMES_KEY)?
            .map(|v| Self::from_value(&v))
            .unwrap_or_default())
    }

    /// Write the registry to `store`.
    pub fn save(&self, store: &dyn PrefsStore) -> prefs::Result<()> {
        store.set(NAMES_KEY, self.to_value())
    }

    /// Insert or replace the name for `space`, returning the previous name.
    pub fn insert(&mut self, space: SpaceId, name: &str) -> Result<Option<String>> {
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "desktop name must not be empty".to_string(),
            ));
        }
        if space.is_unknown() {
            return Err(Error::InvalidArgument(
                "space id 0 is reserved".to_string(),
            ));
        }
        let prev = self.entries.insert(
            space.key(),
            DesktopEntry {
                space,
                name: name.to_string(),
            },
        );
        Ok(prev.map(|e| e.name))
    }

    /// Remove the name for `space`, returning it if one was set.
    pub fn remove(&mut self, space: SpaceId) -> Option<String> {
        self.entries.remove(&space.key()).map(|e| e.name)
    }

    /// User-assigned name for `space`.
    pub fn get(&self, space: SpaceId) -> Option<&str> {
        self.entries.get(&space.key()).map(|e| e.name.as_str())
    }

    /// 1-based position of `space` among named Spaces, or 1 if unnamed.
    pub fn display_number(&self, space: SpaceId) -> usize {
        let key = space.key();
        self.entries
            .keys()
            .position(|k| *k == key)
            .map_or(1, |i| i + 1)
    }

    /// Display name for `space`: the assigned name, else `Desktop <N>`.
    pub fn resolve(&self, space: SpaceId) -> String {
        match self.get(space) {
            Some(name) => name.to_string(),
            None => format!("Desktop {}", self.display_number(space)),
        }
    }

    /// All entries in key string order.
    pub fn entries(&self) -> impl Iterator<Item = &DesktopEntry> {
        self.entries.values()
    }

    /// Number of named Spaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no Space is named.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
