//! Error types for preference storage.

use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the prefs crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors produced while reading or writing preferences.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem failure on the backing file.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The backing file is not a JSON object.
    #[error("Malformed preferences at {}: {message}", path.display())]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// A stored value does not have the type the caller asked for.
    #[error("Preference '{key}' has unexpected type: {message}")]
    Type {
        /// Preference key.
        key: String,
        /// Conversion diagnostic.
        message: String,
    },

    /// Storage rejected the operation.
    #[error("Preference storage unavailable")]
    Unavailable,
}
