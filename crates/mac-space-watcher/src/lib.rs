//! mac-space-watcher: observe the active Mission Control Space on macOS.
//!
//! Two pieces make up the host side of desktop tracking:
//! - [`active_space_id`]: a best-effort query of the window server for the
//!   active Space. Returns `None` if the query fails or the platform is not
//!   macOS.
//! - An NSWorkspace observer for `NSWorkspaceActiveSpaceDidChangeNotification`
//!   that forwards a [`SpaceSignal`] for every Space switch.
//!
//! Integration overview (no code):
//! - Call `set_main_proxy` exactly once on the Tao main thread after creating
//!   the event loop.
//! - Call [`start_watcher`] from any thread with the sender that should
//!   receive [`SpaceSignal`]s. It registers the sender and posts one Tao
//!   `Event::UserEvent(())` through the stored proxy.
//! - In the Tao event loop, answer that user event by calling
//!   `install_ns_workspace_observer()` on the main thread. The call is
//!   idempotent; only the first one installs the observer.
//!
//! On platforms other than macOS the observer is unavailable and
//! [`start_watcher`] fails with [`Error::Unsupported`].

mod cgs;
#[cfg(target_os = "macos")]
mod ns;

pub use cgs::active_space_id;
pub use desktop_ids::SpaceSignal;
#[cfg(target_os = "macos")]
pub use ns::{install_ns_workspace_observer, set_main_proxy, wake_main_loop};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// Errors that can occur when interacting with mac-space-watcher public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// No proxy registered for the main event loop.
    #[error("NS main proxy not set; call set_main_proxy() on the main thread first")]
    MainProxyNotSet,
    /// The proxy lock was poisoned.
    #[error("NS main proxy mutex poisoned")]
    MainProxyPoisoned,
    /// The main event loop is gone.
    #[error("Failed to post install request to main thread")]
    PostEventFailed,
    /// The observer state lock was poisoned.
    #[error("NS observer state mutex poisoned")]
    NsObserverPoisoned,
    /// Space notifications are only available on macOS.
    #[error("Space change notifications are not supported on this platform")]
    Unsupported,
}

/// Starts the Space watcher.
///
/// Effects:
/// - Registers `tx` as the sink for [`SpaceSignal`]s.
/// - Posts exactly one Tao user event requesting installation of the
///   NSWorkspace observer on the main thread. Handle it by calling
///   `install_ns_workspace_observer`.
pub fn start_watcher(tx: UnboundedSender<SpaceSignal>) -> Result<(), Error> {
    #[cfg(target_os = "macos")]
    {
        ns::set_ns_sink(tx);
        ns::request_ns_observer_install()
    }
    #[cfg(not(target_os = "macos"))]
    {
        drop(tx);
        Err(Error::Unsupported)
    }
}

#[cfg(all(test, not(target_os = "macos")))]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn unsupported_off_macos() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(matches!(start_watcher(tx), Err(Error::Unsupported)));
        assert_eq!(active_space_id(), None);
    }
}
