//! Shared identifiers for Mission Control Spaces.
#![warn(missing_docs)]

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier the window server assigns to a Space (virtual desktop).
///
/// The value is opaque: it is stable for the life of the Space but not across
/// reboots or Space re-creation. Zero is reserved as the "unknown" sentinel;
/// a tracker that has not yet observed a Space reports [`SpaceId::UNKNOWN`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(u64);

impl SpaceId {
    /// Sentinel for "no Space observed yet".
    pub const UNKNOWN: Self = Self(0);

    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Wrap a raw identifier, mapping zero to `None`.
    #[must_use]
    pub const fn known(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// True for the zero sentinel.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == 0
    }

    /// Decimal string used as the key in persisted name maps.
    #[must_use]
    pub fn key(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SpaceId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<SpaceId> for u64 {
    fn from(value: SpaceId) -> Self {
        value.get()
    }
}

/// Signal from the host that the active Space may have changed.
///
/// Carries no payload; receivers re-query the active Space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceSignal {
    /// The window server reported an active Space change.
    ActiveSpaceChanged,
}

/// A persisted key that is not the decimal form of a `u64`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid space id '{key}': {reason}")]
pub struct ParseSpaceIdError {
    /// Offending key text.
    pub key: String,
    /// Parser diagnostic.
    pub reason: String,
}

impl ParseSpaceIdError {
    fn new(key: &str, err: &ParseIntError) -> Self {
        Self {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}

impl FromStr for SpaceId {
    type Err = ParseSpaceIdError;

    /// Parse a persisted key. Only canonical decimal text is accepted, so a
    /// parsed id always turns back into the same key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s.parse().map_err(|e| ParseSpaceIdError::new(s, &e))?;
        if raw.to_string() != s {
            return Err(ParseSpaceIdError {
                key: s.to_string(),
                reason: "not in canonical decimal form".to_string(),
            });
        }
        Ok(Self(raw))
    }
}
