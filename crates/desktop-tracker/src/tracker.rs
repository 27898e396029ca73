//! Current desktop identity and name resolution.

use std::sync::Arc;

use desktop_ids::SpaceId;
use prefs::PrefsStore;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    DesktopEvent, Error, Result,
    host::SpaceHost,
    names::{DesktopEntry, DesktopNames},
};

/// Capacity of the desktop event channel.
const EVENT_CAPACITY: usize = 256;

/// Snapshot of the current desktop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopIdentity {
    /// Active Space, or [`SpaceId::UNKNOWN`] before the first successful query.
    pub space: SpaceId,
    /// Resolved display name.
    pub name: String,
}

/// Single source of truth for "which desktop am I on" and "what is it called".
///
/// The tracker is driven by two event sources: host Space-change signals
/// ([`DesktopTracker::on_space_changed`]) and registry changes
/// ([`DesktopTracker::on_registry_changed`]). All mutation goes through
/// `&mut self`; run it on one task (see [`crate::TrackerService`]) so the two
/// sources never interleave.
pub struct DesktopTracker {
    /// Host session used to query the active Space.
    host: Arc<dyn SpaceHost>,
    /// Store holding the persisted registry.
    pub(crate) store: Arc<dyn PrefsStore>,
    /// In-memory registry; authoritative until the next reload.
    names: DesktopNames,
    /// Active Space.
    current: SpaceId,
    /// Resolved name of `current`.
    current_name: String,
    /// Event fan-out.
    events: broadcast::Sender<DesktopEvent>,
}

impl DesktopTracker {
    /// Load the registry and query the host for the active Space.
    ///
    /// A failed host query leaves the tracker on [`SpaceId::UNKNOWN`]; the
    /// first Space observed later is adopted without a change event.
    pub fn initialize(host: Arc<dyn SpaceHost>, store: Arc<dyn PrefsStore>) -> Result<Self> {
        let names = DesktopNames::load(store.as_ref())?;
        let current = host.active_space_id().unwrap_or(SpaceId::UNKNOWN);
        let current_name = names.resolve(current);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        debug!(space = %current, name = %current_name, named = names.len(), "tracker initialized");
        Ok(Self {
            host,
            store,
            names,
            current,
            current_name,
            events,
        })
    }

    /// Subscribe to tracker events.
    pub fn subscribe(&self) -> broadcast::Receiver<DesktopEvent> {
        self.events.subscribe()
    }

    /// Sender side of the event channel, for handles that outlive borrows.
    pub(crate) fn event_sender(&self) -> broadcast::Sender<DesktopEvent> {
        self.events.clone()
    }

    /// Active Space.
    pub fn current_space(&self) -> SpaceId {
        self.current
    }

    /// Resolved name of the active Space.
    pub fn current_name(&self) -> &str {
        &self.current_name
    }

    /// Snapshot of the current identity.
    pub fn current(&self) -> DesktopIdentity {
        DesktopIdentity {
            space: self.current,
            name: self.current_name.clone(),
        }
    }

    /// React to a host Space-change signal. Returns true if a desktop switch
    /// was published.
    pub fn on_space_changed(&mut self) -> bool {
        let Some(next) = self.host.active_space_id().filter(|s| !s.is_unknown()) else {
            debug!(space = %self.current, "active space query failed; keeping current");
            return false;
        };
        if next == self.current {
            return false;
        }
        let prev = self.current;
        self.current = next;
        self.current_name = self.names.resolve(next);
        if prev.is_unknown() {
            debug!(space = %next, name = %self.current_name, "adopted first space");
            self.emit(DesktopEvent::NameChanged {
                space: next,
                name: self.current_name.clone(),
            });
            return false;
        }
        info!(from = %prev, to = %next, name = %self.current_name, "desktop changed");
        self.emit(DesktopEvent::DesktopChanged {
            from: prev,
            to: next,
            name: self.current_name.clone(),
        });
        true
    }

    /// React to a change of the persisted registry.
    ///
    /// Reloads the registry so edits from other writers are honored, then
    /// re-resolves the current name. Never touches the current Space.
    pub fn on_registry_changed(&mut self) {
        match DesktopNames::load(self.store.as_ref()) {
            Ok(names) => self.names = names,
            Err(e) => warn!(error = %e, "desktop names reload failed; keeping in-memory names"),
        }
        self.refresh_name();
    }

    /// Assign `name` to `space` and persist the registry.
    ///
    /// An empty name fails with [`Error::InvalidArgument`] and leaves the
    /// registry untouched. A persistence failure is returned after the
    /// in-memory update has been applied.
    pub fn set_name(&mut self, name: &str, space: SpaceId) -> Result<()> {
        self.names.insert(space, name)?;
        debug!(space = %space, name, "desktop name set");
        let saved = self.names.save(self.store.as_ref());
        if space == self.current {
            self.refresh_name();
        }
        saved.map_err(Error::from)
    }

    /// Remove the name for `space`. Removing an absent name is a no-op.
    pub fn remove_name(&mut self, space: SpaceId) -> Result<()> {
        if self.names.remove(space).is_none() {
            return Ok(());
        }
        debug!(space = %space, "desktop name removed");
        let saved = self.names.save(self.store.as_ref());
        // Removal can shift the synthesized number of the current Space too.
        self.refresh_name();
        saved.map_err(Error::from)
    }

    /// All named Spaces in key string order.
    pub fn list_all(&self) -> Vec<DesktopEntry> {
        self.names.entries().cloned().collect()
    }

    /// Re-resolve the current name, publishing a change if it differs.
    fn refresh_name(&mut self) {
        let name = self.names.resolve(self.current);
        if name == self.current_name {
            return;
        }
        debug!(space = %self.current, from = %self.current_name, to = %name, "desktop name resolved");
        self.current_name = name;
        self.emit(DesktopEvent::NameChanged {
            space: self.current,
            name: self.current_name.clone(),
        });
    }

    fn emit(&self, event: DesktopEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use prefs::{MemoryStore, PrefsStore};
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;
    use crate::{host::FakeSpaceHost, names::NAMES_KEY};

    struct Rig {
        host: Arc<FakeSpaceHost>,
        store: Arc<MemoryStore>,
        tracker: DesktopTracker,
        rx: broadcast::Receiver<DesktopEvent>,
    }

    fn rig(space: u64) -> Rig {
        let host = Arc::new(FakeSpaceHost::new(space));
        let store = Arc::new(MemoryStore::new());
        let tracker = DesktopTracker::initialize(host.clone(), store.clone()).unwrap();
        let rx = tracker.subscribe();
        Rig {
            host,
            store,
            tracker,
            rx,
        }
    }

    fn drain(rx: &mut broadcast::Receiver<DesktopEvent>) -> Vec<DesktopEvent> {
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(ev) => out.push(ev),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        out
    }

    fn sid(n: u64) -> SpaceId {
        SpaceId::new(n)
    }

    #[test]
    fn switch_emits_exactly_one_change() {
        let mut r = rig(3);
        assert_eq!(r.tracker.current_space(), sid(3));

        r.host.set_active(8);
        assert!(r.tracker.on_space_changed());
        assert_eq!(r.tracker.current_space(), sid(8));
        let evs = drain(&mut r.rx);
        assert_eq!(
            evs,
            vec![DesktopEvent::DesktopChanged {
                from: sid(3),
                to: sid(8),
                name: "Desktop 1".into(),
            }]
        );

        // Repeated notification for the same Space is silent.
        assert!(!r.tracker.on_space_changed());
        assert!(drain(&mut r.rx).is_empty());
    }

    #[test]
    fn first_space_after_sentinel_is_not_a_switch() {
        let mut r = rig(0);
        assert!(r.tracker.current_space().is_unknown());
        r.host.set_active(12);
        assert!(!r.tracker.on_space_changed());
        assert_eq!(r.tracker.current_space(), sid(12));
        let evs = drain(&mut r.rx);
        assert!(evs.iter().all(|e| !e.is_desktop_change()));

        // Later switches are reported.
        r.host.set_active(13);
        assert!(r.tracker.on_space_changed());
        assert_eq!(drain(&mut r.rx).len(), 1);
    }

    #[test]
    fn failed_query_keeps_previous_space() {
        let mut r = rig(4);
        r.host.set_active(9);
        r.host.set_fail(true);
        assert!(!r.tracker.on_space_changed());
        assert_eq!(r.tracker.current_space(), sid(4));
        assert!(drain(&mut r.rx).is_empty());

        r.host.set_fail(false);
        assert!(r.tracker.on_space_changed());
        assert_eq!(r.tracker.current_space(), sid(9));
    }

    #[test]
    fn naming_current_space_updates_name_without_switch() {
        let mut r = rig(5);
        r.tracker.set_name("Office", sid(5)).unwrap();
        assert_eq!(r.tracker.current_name(), "Office");
        let evs = drain(&mut r.rx);
        assert_eq!(
            evs,
            vec![DesktopEvent::NameChanged {
                space: sid(5),
                name: "Office".into(),
            }]
        );
        assert_eq!(r.store.get(NAMES_KEY).unwrap(), Some(json!({"5": "Office"})));
    }

    #[test]
    fn removing_current_name_reverts_to_default() {
        let mut r = rig(5);
        r.tracker.set_name("Office", sid(5)).unwrap();
        r.tracker.remove_name(sid(5)).unwrap();
        assert_eq!(r.tracker.current_name(), "Desktop 1");
        assert_eq!(r.store.get(NAMES_KEY).unwrap(), Some(json!({})));
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut r = rig(7);
        r.tracker.set_name("Seven", sid(7)).unwrap();
        drain(&mut r.rx);
        let err = r.tracker.set_name("", sid(7)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(r.tracker.current_name(), "Seven");
        assert_eq!(r.tracker.list_all().len(), 1);
        assert!(drain(&mut r.rx).is_empty());
    }

    #[test]
    fn list_all_uses_string_order() {
        let mut r = rig(1);
        for n in [2, 10, 1] {
            r.tracker.set_name(&format!("D{n}"), sid(n)).unwrap();
        }
        let order: Vec<String> = r.tracker.list_all().iter().map(|e| e.space.key()).collect();
        assert_eq!(order, vec!["1", "10", "2"]);
    }

    #[test]
    fn removing_absent_name_twice_is_harmless() {
        let mut r = rig(1);
        r.tracker.set_name("One", sid(1)).unwrap();
        let before = r.tracker.list_all();
        r.tracker.remove_name(sid(42)).unwrap();
        r.tracker.remove_name(sid(42)).unwrap();
        assert_eq!(r.tracker.list_all(), before);
    }

    #[test]
    fn persistence_failure_keeps_in_memory_update() {
        let mut r = rig(6);
        r.store.set_fail_writes(true);
        let err = r.tracker.set_name("Scratch", sid(6)).unwrap_err();
        assert!(matches!(err, Error::Persistence(prefs::Error::Unavailable)));
        assert_eq!(r.tracker.current_name(), "Scratch");
        assert_eq!(r.store.get(NAMES_KEY).unwrap(), None);

        // Still usable afterwards.
        r.store.set_fail_writes(false);
        r.tracker.set_name("Scratch", sid(6)).unwrap();
        assert_eq!(r.store.get(NAMES_KEY).unwrap(), Some(json!({"6": "Scratch"})));
    }

    #[test]
    fn registry_change_renames_without_switch() {
        let mut r = rig(20);
        r.store.set(NAMES_KEY, json!({"20": "Music"})).unwrap();
        r.tracker.on_registry_changed();
        assert_eq!(r.tracker.current_space(), sid(20));
        assert_eq!(r.tracker.current_name(), "Music");
        let evs = drain(&mut r.rx);
        assert_eq!(evs.len(), 1);
        assert!(!evs[0].is_desktop_change());
    }

    #[test]
    fn synthesized_number_tracks_named_position() {
        let mut r = rig(30);
        r.tracker.set_name("Three", sid(3)).unwrap();
        r.tracker.set_name("Thirty", sid(30)).unwrap();
        r.tracker.remove_name(sid(30)).unwrap();
        // 30 is no longer named, so it falls back to the default position.
        assert_eq!(r.tracker.current_name(), "Desktop 1");
    }

    #[test]
    fn initial_name_comes_from_store() {
        let host = Arc::new(FakeSpaceHost::new(2));
        let store = Arc::new(MemoryStore::new());
        store.set(NAMES_KEY, json!({"2": "Design"})).unwrap();
        let tracker = DesktopTracker::initialize(host, store).unwrap();
        assert_eq!(
            tracker.current(),
            DesktopIdentity {
                space: sid(2),
                name: "Design".into(),
            }
        );
    }
}
