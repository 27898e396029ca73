use desktop_ids::SpaceId;
#[cfg(target_os = "macos")]
use tracing::trace;

#[cfg(target_os = "macos")]
#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGSMainConnectionID() -> i32;
    fn CGSGetActiveSpace(connection: i32) -> u64;
}

/// Best-effort: the window server's active Space for this login session.
///
/// Returns `None` when the connection is unavailable or the window server
/// reports no active Space.
#[cfg(target_os = "macos")]
pub fn active_space_id() -> Option<SpaceId> {
    let cid = unsafe { CGSMainConnectionID() };
    if cid == 0 {
        trace!("no window server connection");
        return None;
    }
    let raw = unsafe { CGSGetActiveSpace(cid) };
    trace!(space = raw, "active space");
    SpaceId::known(raw)
}

/// Always `None`: there is no window server to ask.
#[cfg(not(target_os = "macos"))]
pub fn active_space_id() -> Option<SpaceId> {
    None
}
