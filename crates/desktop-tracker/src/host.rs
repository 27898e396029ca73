//! Host desktop-session abstraction.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub use desktop_ids::SpaceSignal;
use desktop_ids::SpaceId;
use parking_lot::Mutex;

/// Trait abstraction over the host's desktop session to improve testability.
pub trait SpaceHost: Send + Sync {
    /// Identifier of the active Space, or `None` if the query failed.
    fn active_space_id(&self) -> Option<SpaceId>;
}

/// Scriptable [`SpaceHost`] for tests and headless runs.
#[derive(Debug, Default)]
pub struct FakeSpaceHost {
    /// Space reported by the next query.
    active: Mutex<Option<SpaceId>>,
    /// When set, queries fail.
    fail: AtomicBool,
    /// Number of queries served.
    queries: AtomicUsize,
}

impl FakeSpaceHost {
    /// Create a host whose active Space is `space`.
    pub fn new(space: u64) -> Self {
        let host = Self::default();
        host.set_active(space);
        host
    }

    /// Change the active Space. Zero means "nothing reported".
    pub fn set_active(&self, space: u64) {
        *self.active.lock() = SpaceId::known(space);
    }

    /// Make queries fail (or succeed again).
    pub fn set_fail(&self, v: bool) {
        self.fail.store(v, Ordering::SeqCst);
    }

    /// How many times the active Space was queried.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl SpaceHost for FakeSpaceHost {
    fn active_space_id(&self) -> Option<SpaceId> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return None;
        }
        *self.active.lock()
    }
}
