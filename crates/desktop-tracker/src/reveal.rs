//! Transient expand-then-collapse of the notch on desktop switches.
//!
//! [`run`] consumes tracker events and emits [`RevealSignal`]s for the
//! presentation layer. Each desktop switch produces an `Expand`; a `Collapse`
//! follows once the auto-hide delay passes without another switch. A switch
//! while expanded re-emits `Expand` and restarts the delay.
//!
//! [`run_with_settings`] follows the desktop settings in a preferences store:
//! turning the reveal off collapses an expanded notch at once, and a new
//! delay applies from the next switch.

use std::{future, sync::Arc, time::Duration};

use desktop_ids::SpaceId;
use prefs::PrefsStore;
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc,
    },
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{
    DesktopEvent,
    settings::{self, DesktopSettings},
};

/// Instructions for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealSignal {
    /// Expand and show `name`.
    Expand {
        /// Space just switched to.
        space: SpaceId,
        /// Its display name.
        name: String,
    },
    /// Collapse back to the resting state.
    Collapse,
}

/// When and for how long to reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealPolicy {
    /// Reveal at all.
    pub enabled: bool,
    /// Time to stay expanded after the last switch.
    pub delay: Duration,
}

impl RevealPolicy {
    /// Derive the policy from user settings and the screen shape. Screens
    /// without a notch never auto-expand.
    pub fn from_settings(settings: &DesktopSettings, notched: bool) -> Self {
        Self {
            enabled: notched && settings.auto_expand_enabled(),
            delay: settings.auto_hide_delay(),
        }
    }
}

/// Where the policy comes from.
enum PolicySource {
    /// Fixed for the life of the task.
    Fixed,
    /// Re-read from a preferences store whenever a desktop setting changes.
    Settings {
        /// Settings storage.
        store: Arc<dyn PrefsStore>,
        /// Changed-key notifications from `store`.
        keys: broadcast::Receiver<String>,
        /// Whether the screen has a notch.
        notched: bool,
    },
}

impl PolicySource {
    /// Resolve with the new policy once a desktop setting changes. Never
    /// resolves for a fixed policy.
    async fn changed(&mut self) -> RevealPolicy {
        let Self::Settings {
            store,
            keys,
            notched,
        } = self
        else {
            return future::pending().await;
        };
        loop {
            match keys.recv().await {
                Ok(key) if settings::is_settings_key(&key) => {}
                Ok(_) => continue,
                Err(RecvError::Lagged(n)) => debug!(missed = n, "settings notifications lagged"),
                Err(RecvError::Closed) => return future::pending().await,
            }
            match DesktopSettings::load(&**store) {
                Ok(s) => return RevealPolicy::from_settings(&s, *notched),
                Err(e) => warn!("desktop settings unreadable; keeping reveal policy: {}", e),
            }
        }
    }
}

/// Drive reveal signals from `events` with a fixed `policy` until cancelled
/// or the event source closes. An expanded notch is collapsed before
/// returning.
pub async fn run(
    events: broadcast::Receiver<DesktopEvent>,
    policy: RevealPolicy,
    out: mpsc::UnboundedSender<RevealSignal>,
    cancel: CancellationToken,
) {
    drive(events, policy, PolicySource::Fixed, out, cancel).await;
}

/// Like [`run`], but the policy tracks the desktop settings held in `store`.
/// Unreadable settings fall back to the defaults at startup and keep the
/// previous policy afterwards.
pub async fn run_with_settings(
    events: broadcast::Receiver<DesktopEvent>,
    store: Arc<dyn PrefsStore>,
    notched: bool,
    out: mpsc::UnboundedSender<RevealSignal>,
    cancel: CancellationToken,
) {
    let keys = store.subscribe();
    let initial = DesktopSettings::load(store.as_ref()).unwrap_or_else(|e| {
        warn!("desktop settings unreadable; using defaults: {}", e);
        DesktopSettings::default()
    });
    let policy = RevealPolicy::from_settings(&initial, notched);
    let source = PolicySource::Settings {
        store,
        keys,
        notched,
    };
    drive(events, policy, source, out, cancel).await;
}

async fn drive(
    mut events: broadcast::Receiver<DesktopEvent>,
    mut policy: RevealPolicy,
    mut source: PolicySource,
    out: mpsc::UnboundedSender<RevealSignal>,
    cancel: CancellationToken,
) {
    let mut deadline: Option<Instant> = None;
    loop {
        let pending_collapse = deadline;
        let collapse_at = async move {
            match pending_collapse {
                Some(d) => time::sleep_until(d).await,
                None => future::pending().await,
            }
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = collapse_at => {
                deadline = None;
                trace!("reveal collapse");
                if out.send(RevealSignal::Collapse).is_err() {
                    return;
                }
            }
            next = source.changed() => {
                debug!(enabled = next.enabled, delay = ?next.delay, "reveal policy updated");
                policy = next;
                if !policy.enabled && deadline.take().is_some() {
                    trace!("reveal disabled while expanded");
                    if out.send(RevealSignal::Collapse).is_err() {
                        return;
                    }
                }
            }
            ev = events.recv() => match ev {
                Ok(DesktopEvent::DesktopChanged { to, name, .. }) if policy.enabled => {
                    trace!(space = %to, "reveal expand");
                    if out.send(RevealSignal::Expand { space: to, name }).is_err() {
                        return;
                    }
                    deadline = Some(Instant::now() + policy.delay);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => debug!(missed = n, "reveal lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    if deadline.is_some() {
        let _ = out.send(RevealSignal::Collapse);
    }
}

#[cfg(test)]
mod tests {
    use prefs::MemoryStore;
    use serde_json::json;

    use super::*;
    use crate::settings::{AUTO_HIDE_DELAY_KEY, SHOW_NAME_KEY};

    fn policy(secs: f64) -> RevealPolicy {
        RevealPolicy {
            enabled: true,
            delay: Duration::from_secs_f64(secs),
        }
    }

    fn changed(to: u64, name: &str) -> DesktopEvent {
        DesktopEvent::DesktopChanged {
            from: SpaceId::new(1),
            to: SpaceId::new(to),
            name: name.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn expands_then_collapses_after_delay() {
        let (tx, rx) = broadcast::channel(16);
        let (out, mut signals) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(run(rx, policy(1.5), out, cancel.clone()));

        let start = Instant::now();
        tx.send(changed(2, "Mail")).unwrap();
        assert_eq!(
            signals.recv().await,
            Some(RevealSignal::Expand {
                space: SpaceId::new(2),
                name: "Mail".into()
            })
        );
        assert_eq!(signals.recv().await, Some(RevealSignal::Collapse));
        assert!(start.elapsed() >= Duration::from_millis(1500));
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn second_switch_restarts_delay() {
        let (tx, rx) = broadcast::channel(16);
        let (out, mut signals) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(run(rx, policy(2.0), out, cancel.clone()));

        tx.send(changed(2, "A")).unwrap();
        assert!(matches!(signals.recv().await, Some(RevealSignal::Expand { .. })));
        time::sleep(Duration::from_secs(1)).await;

        let second = Instant::now();
        tx.send(changed(3, "B")).unwrap();
        assert_eq!(
            signals.recv().await,
            Some(RevealSignal::Expand {
                space: SpaceId::new(3),
                name: "B".into()
            })
        );
        assert_eq!(signals.recv().await, Some(RevealSignal::Collapse));
        assert!(second.elapsed() >= Duration::from_secs(2));
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_policy_and_renames_are_silent() {
        let (tx, rx) = broadcast::channel(16);
        let (out, mut signals) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let disabled = RevealPolicy {
            enabled: false,
            ..policy(1.0)
        };
        let task = tokio::spawn(run(rx, disabled, out, cancel.clone()));

        tx.send(changed(2, "A")).unwrap();
        tx.send(DesktopEvent::NameChanged {
            space: SpaceId::new(2),
            name: "B".into(),
        })
        .unwrap();
        drop(tx);
        task.await.unwrap();
        assert_eq!(signals.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_while_expanded_collapses() {
        let (tx, rx) = broadcast::channel(16);
        let (out, mut signals) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(rx, policy(5.0), out, CancellationToken::new()));

        tx.send(changed(4, "Four")).unwrap();
        assert!(matches!(signals.recv().await, Some(RevealSignal::Expand { .. })));
        drop(tx);
        task.await.unwrap();
        assert_eq!(signals.recv().await, Some(RevealSignal::Collapse));
        assert_eq!(signals.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn turning_the_setting_off_collapses_and_silences() {
        let store = Arc::new(MemoryStore::new());
        let (tx, rx) = broadcast::channel(16);
        let (out, mut signals) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_with_settings(
            rx,
            store.clone(),
            true,
            out,
            CancellationToken::new(),
        ));

        tx.send(changed(2, "Mail")).unwrap();
        assert!(matches!(signals.recv().await, Some(RevealSignal::Expand { .. })));

        // Switched off mid-reveal: collapse right away, well before the delay.
        let start = Instant::now();
        store.set(SHOW_NAME_KEY, json!(false)).unwrap();
        assert_eq!(signals.recv().await, Some(RevealSignal::Collapse));
        assert!(start.elapsed() < Duration::from_millis(1500));

        // Later switches are silent.
        tx.send(changed(3, "Code")).unwrap();
        drop(tx);
        task.await.unwrap();
        assert_eq!(signals.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn stored_delay_is_used() {
        let store = Arc::new(MemoryStore::new());
        store.set(AUTO_HIDE_DELAY_KEY, json!(3.0)).unwrap();
        let (tx, rx) = broadcast::channel(16);
        let (out, mut signals) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(run_with_settings(rx, store, true, out, cancel.clone()));

        let start = Instant::now();
        tx.send(changed(2, "Mail")).unwrap();
        assert!(matches!(signals.recv().await, Some(RevealSignal::Expand { .. })));
        assert_eq!(signals.recv().await, Some(RevealSignal::Collapse));
        assert!(start.elapsed() >= Duration::from_secs(3));
        cancel.cancel();
    }

    #[test]
    fn policy_requires_notch_and_settings() {
        let s = DesktopSettings::default();
        assert!(RevealPolicy::from_settings(&s, true).enabled);
        assert!(!RevealPolicy::from_settings(&s, false).enabled);
        let hidden = DesktopSettings {
            show_desktop_name: false,
            ..s
        };
        assert!(!RevealPolicy::from_settings(&hidden, true).enabled);
    }
}
