use desktop_ids::SpaceId;

/// Notifications published by the desktop tracker.
///
/// Semantics:
/// - `DesktopChanged { from, to, name }`: the user switched from one known
///   Space to another. Never emitted for the first Space observed after
///   startup, and never for a repeated notification about the same Space.
/// - `NameChanged { space, name }`: the resolved name of the current Space
///   changed without a Space switch (rename, removal, external edit, or the
///   first Space being adopted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesktopEvent {
    /// The active Space changed.
    DesktopChanged {
        /// Previously active Space.
        from: SpaceId,
        /// Newly active Space.
        to: SpaceId,
        /// Resolved name of the new Space.
        name: String,
    },
    /// The current Space's display name changed.
    NameChanged {
        /// Current Space.
        space: SpaceId,
        /// New display name.
        name: String,
    },
}

impl DesktopEvent {
    /// True for a Space switch.
    pub fn is_desktop_change(&self) -> bool {
        matches!(self, Self::DesktopChanged { .. })
    }
}
