use desktop_tracker::{SpaceHost, SpaceId};

/// [`SpaceHost`] backed by the macOS window server.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacSpaceHost;

impl SpaceHost for MacSpaceHost {
    fn active_space_id(&self) -> Option<SpaceId> {
        mac_space_watcher::active_space_id()
    }
}
