//! Error handling for the notchdesk binary.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for notchdesk commands.
pub type Result<T> = result::Result<T, Error>;

/// Errors surfaced to the user.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Desktop naming failed.
    #[error("{0}")]
    Tracker(#[from] desktop_tracker::Error),
    /// Preferences could not be read or written.
    #[error("Preferences error: {0}")]
    Prefs(#[from] prefs::Error),
    /// The host watcher could not be started.
    #[error("Space watcher error: {0}")]
    Watcher(#[from] mac_space_watcher::Error),
    /// The active Space could not be determined.
    #[error("Active space unavailable; pass --space explicitly")]
    NoActiveSpace,
}
