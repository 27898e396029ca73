//! Minimal test support utilities for tracker consumers.

use std::time::Duration;

use tokio::{
    sync::broadcast::{self, error::RecvError},
    time::{Instant, timeout_at},
};

use crate::DesktopEvent;

/// Wait up to `timeout_ms` for an event matching `pred`, skipping others.
pub async fn recv_event_until<P>(
    rx: &mut broadcast::Receiver<DesktopEvent>,
    timeout_ms: u64,
    mut pred: P,
) -> Option<DesktopEvent>
where
    P: FnMut(&DesktopEvent) -> bool,
{
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        match timeout_at(deadline, rx.recv()).await {
            Ok(Ok(ev)) if pred(&ev) => return Some(ev),
            Ok(Ok(_)) | Ok(Err(RecvError::Lagged(_))) => {}
            Ok(Err(RecvError::Closed)) | Err(_) => return None,
        }
    }
}

/// Discard every event currently queued on `rx`.
pub fn drain_events(rx: &mut broadcast::Receiver<DesktopEvent>) -> usize {
    let mut n = 0;
    while let Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) = rx.try_recv() {
        n += 1;
    }
    n
}
