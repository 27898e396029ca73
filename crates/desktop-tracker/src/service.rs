//! Single-task tracker service.
//!
//! [`TrackerService::spawn`] moves a [`DesktopTracker`] onto one Tokio task.
//! Host Space signals, registry change notifications and handle requests are
//! all consumed by that task, so tracker updates are atomic with respect to
//! every reader.
//!
//! The task polls host signals first, then registry notifications, then
//! requests. A request therefore observes every signal and registry change
//! queued before it was sent.

use desktop_ids::SpaceId;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc, oneshot,
};
use tracing::{debug, trace, warn};

use crate::{
    DesktopEvent, DesktopIdentity, DesktopTracker, Error, Result, host::SpaceSignal,
    names::{DesktopEntry, NAMES_KEY},
};

/// Requests served by the tracker task.
enum Command {
    /// Assign a name.
    SetName {
        /// Target Space.
        space: SpaceId,
        /// New name.
        name: String,
        /// Reply channel.
        respond: oneshot::Sender<Result<()>>,
    },
    /// Remove a name.
    RemoveName {
        /// Target Space.
        space: SpaceId,
        /// Reply channel.
        respond: oneshot::Sender<Result<()>>,
    },
    /// List named Spaces.
    ListAll {
        /// Reply channel.
        respond: oneshot::Sender<Vec<DesktopEntry>>,
    },
    /// Current identity.
    Current {
        /// Reply channel.
        respond: oneshot::Sender<DesktopIdentity>,
    },
    /// Stop the task.
    Shutdown,
}

/// Cheap, clonable handle to the tracker service.
#[derive(Clone, Debug)]
pub struct TrackerHandle {
    /// Request channel.
    tx: mpsc::UnboundedSender<Command>,
    /// Event fan-out shared with the tracker.
    events: broadcast::Sender<DesktopEvent>,
}

impl TrackerHandle {
    /// Subscribe to desktop events.
    pub fn subscribe(&self) -> broadcast::Receiver<DesktopEvent> {
        self.events.subscribe()
    }

    /// Assign `name` to `space`.
    pub async fn set_name(&self, name: impl Into<String>, space: SpaceId) -> Result<()> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::SetName {
            space,
            name: name.into(),
            respond,
        })?;
        rx.await.map_err(|_| Error::ServiceClosed)?
    }

    /// Remove the name for `space`.
    pub async fn remove_name(&self, space: SpaceId) -> Result<()> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::RemoveName { space, respond })?;
        rx.await.map_err(|_| Error::ServiceClosed)?
    }

    /// All named Spaces in key string order.
    pub async fn list_all(&self) -> Result<Vec<DesktopEntry>> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::ListAll { respond })?;
        rx.await.map_err(|_| Error::ServiceClosed)
    }

    /// Current Space and name.
    pub async fn current(&self) -> Result<DesktopIdentity> {
        let (respond, rx) = oneshot::channel();
        self.send(Command::Current { respond })?;
        rx.await.map_err(|_| Error::ServiceClosed)
    }

    /// Ask the service to stop. Pending requests queued before this one are
    /// still served.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.tx.send(cmd).map_err(|_| Error::ServiceClosed)
    }
}

/// Tracker service constructor.
pub struct TrackerService;

impl TrackerService {
    /// Spawn the service on the current Tokio runtime and return a handle.
    ///
    /// `signals` carries host Space-change notifications. Registry change
    /// notifications are taken from the tracker's preferences store.
    pub fn spawn(
        tracker: DesktopTracker,
        signals: mpsc::UnboundedReceiver<SpaceSignal>,
    ) -> TrackerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let events = tracker.event_sender();
        let registry = tracker.store.subscribe();
        tokio::spawn(run_actor(tracker, rx, signals, registry));
        TrackerHandle { tx, events }
    }
}

async fn run_actor(
    mut tracker: DesktopTracker,
    mut rx: mpsc::UnboundedReceiver<Command>,
    mut signals: mpsc::UnboundedReceiver<SpaceSignal>,
    mut registry: broadcast::Receiver<String>,
) {
    let mut signals_open = true;
    let mut registry_open = true;
    loop {
        tokio::select! {
            biased;
            sig = signals.recv(), if signals_open => match sig {
                Some(SpaceSignal::ActiveSpaceChanged) => {
                    trace!("space signal");
                    tracker.on_space_changed();
                }
                None => {
                    debug!("space signal source closed");
                    signals_open = false;
                }
            },
            key = registry.recv(), if registry_open => match key {
                Ok(key) if key == NAMES_KEY => tracker.on_registry_changed(),
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => {
                    warn!(missed = n, "registry notifications lagged; reloading");
                    tracker.on_registry_changed();
                }
                Err(RecvError::Closed) => registry_open = false,
            },
            cmd = rx.recv() => match cmd {
                Some(Command::Shutdown) | None => break,
                Some(cmd) => handle_command(&mut tracker, cmd),
            },
        }
    }
    debug!("tracker service stopped");
}

fn handle_command(tracker: &mut DesktopTracker, cmd: Command) {
    match cmd {
        Command::SetName {
            space,
            name,
            respond,
        } => {
            let _ = respond.send(tracker.set_name(&name, space));
        }
        Command::RemoveName { space, respond } => {
            let _ = respond.send(tracker.remove_name(space));
        }
        Command::ListAll { respond } => {
            let _ = respond.send(tracker.list_all());
        }
        Command::Current { respond } => {
            let _ = respond.send(tracker.current());
        }
        Command::Shutdown => {}
    }
}
