//! `watch`: run the tracker service against the live window server.
//!
//! The NSWorkspace observer must live on the main thread, so the main thread
//! runs a Tao event loop while the tracker service, the reveal timer and the
//! event printer run on a Tokio runtime in a background thread.

use std::sync::Arc;

use prefs::JsonFileStore;

use crate::{cli::WatchArgs, error::Result};

/// Watch desktop switches until Ctrl-C, printing tracker events and reveal
/// signals. Blocks the main thread in the Tao event loop.
#[cfg(target_os = "macos")]
pub fn run(store: Arc<JsonFileStore>, args: &WatchArgs) -> Result<()> {
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        thread,
    };

    use desktop_tracker::DesktopTracker;
    use tao::{
        event::Event,
        event_loop::{ControlFlow, EventLoopBuilder},
    };
    use tokio::{runtime::Builder, sync::mpsc};
    use tracing::error;

    use crate::host::MacSpaceHost;

    let event_loop = EventLoopBuilder::<()>::with_user_event().build();
    mac_space_watcher::set_main_proxy(event_loop.create_proxy());

    let (sig_tx, sig_rx) = mpsc::unbounded_channel();
    mac_space_watcher::start_watcher(sig_tx)?;

    let tracker = DesktopTracker::initialize(Arc::new(MacSpaceHost), store.clone())?;
    let notched = args.notched;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_bg = stop.clone();
    let rt = Builder::new_multi_thread().enable_all().build()?;
    thread::spawn(move || {
        rt.block_on(drive(tracker, sig_rx, store, notched));
        stop_bg.store(true, Ordering::SeqCst);
        if let Err(e) = mac_space_watcher::wake_main_loop() {
            error!("failed to wake main loop: {}", e);
        }
    });

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        if let Event::UserEvent(()) = event
            && let Err(e) = mac_space_watcher::install_ns_workspace_observer()
        {
            error!("failed to install space observer: {}", e);
        }
        if stop.load(Ordering::SeqCst) {
            *control_flow = ControlFlow::Exit;
        }
    })
}

/// Watching needs the macOS window server; elsewhere this reports
/// [`mac_space_watcher::Error::Unsupported`].
#[cfg(not(target_os = "macos"))]
pub fn run(_store: Arc<JsonFileStore>, _args: &WatchArgs) -> Result<()> {
    let (sig_tx, _sig_rx) = tokio::sync::mpsc::unbounded_channel();
    mac_space_watcher::start_watcher(sig_tx)?;
    Ok(())
}

/// Serve tracker events until Ctrl-C.
#[cfg(target_os = "macos")]
async fn drive(
    tracker: desktop_tracker::DesktopTracker,
    signals: tokio::sync::mpsc::UnboundedReceiver<desktop_tracker::SpaceSignal>,
    store: Arc<JsonFileStore>,
    notched: bool,
) {
    use std::time::Duration;

    use desktop_tracker::{
        DesktopEvent, TrackerService,
        reveal::{self, RevealSignal},
    };
    use tokio::{
        signal,
        sync::{broadcast::error::RecvError, mpsc},
        time,
    };
    use tokio_util::sync::CancellationToken;
    use tracing::{info, warn};

    // Picks up names written by other notchdesk invocations.
    const PREFS_RELOAD_INTERVAL: Duration = Duration::from_secs(2);

    let handle = TrackerService::spawn(tracker, signals);
    let mut events = handle.subscribe();
    match handle.current().await {
        Ok(id) => info!(space = %id.space, name = %id.name, "watching desktops"),
        Err(e) => warn!("tracker unavailable: {}", e),
    }

    // Settings reloaded from disk are broadcast by the store, so the reveal
    // task follows edits made by `notchdesk settings`.
    let (reveal_tx, mut reveal_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    tokio::spawn(reveal::run_with_settings(
        handle.subscribe(),
        store.clone(),
        notched,
        reveal_tx,
        cancel.clone(),
    ));

    let mut reload = time::interval(PREFS_RELOAD_INTERVAL);
    let mut reveal_open = true;
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            ev = events.recv() => match ev {
                Ok(DesktopEvent::DesktopChanged { from, to, name }) => {
                    println!("desktop {from} -> {to}\t{name}");
                }
                Ok(DesktopEvent::NameChanged { space, name }) => {
                    println!("name {space}\t{name}");
                }
                Err(RecvError::Lagged(n)) => warn!(missed = n, "event printer lagged"),
                Err(RecvError::Closed) => break,
            },
            sig = reveal_rx.recv(), if reveal_open => match sig {
                Some(RevealSignal::Expand { space, name }) => println!("reveal {space}\t{name}"),
                Some(RevealSignal::Collapse) => println!("collapse"),
                None => reveal_open = false,
            },
            _ = reload.tick() => {
                if let Err(e) = store.reload() {
                    warn!("prefs reload failed: {}", e);
                }
            }
        }
    }
    cancel.cancel();
    handle.shutdown();
}
