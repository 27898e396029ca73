//! desktop-tracker: which desktop (Space) is active and what it is called.
//!
//! Integration overview:
//! - Build a [`DesktopTracker`] with a [`SpaceHost`] (the OS session, or
//!   [`FakeSpaceHost`] in tests) and a [`prefs::PrefsStore`] holding the
//!   desktop name registry.
//! - Hand it to [`TrackerService::spawn`] together with the receiver of host
//!   [`SpaceSignal`]s. The service owns the tracker from then on and serializes
//!   host signals, registry notifications and [`TrackerHandle`] requests on a
//!   single task.
//! - Observers call [`TrackerHandle::subscribe`] and react to
//!   [`DesktopEvent`]s; [`reveal::run`] turns desktop switches into transient
//!   expand/collapse signals according to [`DesktopSettings`].

mod error;
mod events;
mod host;
pub mod names;
pub mod reveal;
mod service;
pub mod settings;
pub mod test_support;
mod tracker;

pub use desktop_ids::SpaceId;
pub use error::{Error, Result};
pub use events::DesktopEvent;
pub use host::{FakeSpaceHost, SpaceHost, SpaceSignal};
pub use names::{DesktopEntry, DesktopNames};
pub use service::{TrackerHandle, TrackerService};
pub use settings::DesktopSettings;
pub use tracker::{DesktopIdentity, DesktopTracker};
