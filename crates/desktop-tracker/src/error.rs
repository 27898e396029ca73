use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the tracker crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors reported by desktop naming operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller passed an argument the registry cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The preferences store rejected a write.
    #[error("Persistence error: {0}")]
    Persistence(#[from] prefs::Error),

    /// The tracker service has shut down.
    #[error("Tracker service closed")]
    ServiceClosed,
}
