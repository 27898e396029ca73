use std::{ptr::NonNull, sync::Mutex};

use block2::StackBlock;
use desktop_ids::SpaceSignal;
use objc2_app_kit::{NSWorkspace, NSWorkspaceActiveSpaceDidChangeNotification};
use objc2_foundation::NSNotification;
use once_cell::sync::Lazy;
use tao::event_loop::EventLoopProxy;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, trace};

// Sink for Space signals (emitted from the main thread)
static NS_SINK: Lazy<Mutex<Option<UnboundedSender<SpaceSignal>>>> = Lazy::new(|| Mutex::new(None));

/// Set the sink used by the NSWorkspace observer.
///
/// Must be called before requesting installation of the observer.
pub(crate) fn set_ns_sink(tx: UnboundedSender<SpaceSignal>) {
    if let Ok(mut guard) = NS_SINK.lock() {
        *guard = Some(tx);
    }
}

// Main-thread proxy to schedule installs safely on TAO event loop
static MAIN_PROXY: Lazy<Mutex<Option<EventLoopProxy<()>>>> = Lazy::new(|| Mutex::new(None));

/// Provide the Tao main-thread `EventLoopProxy<()>` used to schedule
/// installation of the NSWorkspace observer.
///
/// Call exactly once on the Tao main thread, after creating the event loop
/// and before calling [`crate::start_watcher`].
pub fn set_main_proxy(proxy: EventLoopProxy<()>) {
    if let Ok(mut g) = MAIN_PROXY.lock() {
        *g = Some(proxy);
    }
}

/// Post a user event to the main loop asking it to install the observer.
pub(crate) fn request_ns_observer_install() -> Result<(), crate::Error> {
    match MAIN_PROXY.lock() {
        Ok(guard) => match &*guard {
            Some(p) => {
                if p.send_event(()).is_err() {
                    return Err(crate::Error::PostEventFailed);
                }
                Ok(())
            }
            None => Err(crate::Error::MainProxyNotSet),
        },
        Err(_) => Err(crate::Error::MainProxyPoisoned),
    }
}

/// Post a generic Tao `UserEvent(())` to wake the main event loop.
///
/// Useful when another thread flips a shutdown flag while the loop waits.
pub fn wake_main_loop() -> Result<(), crate::Error> {
    request_ns_observer_install()
}

fn ns_emit_space_changed() {
    if let Ok(guard) = NS_SINK.lock()
        && let Some(tx) = &*guard
    {
        let _ = tx.send(SpaceSignal::ActiveSpaceChanged);
    }
}

// Whether the observer has been installed
static NS_OBS_TOKEN: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

/// Install the NSWorkspace active-Space observer on the current (main) thread.
///
/// Call from the Tao event loop in response to the user event posted by
/// [`crate::start_watcher`]. Idempotent: only the first call installs.
pub fn install_ns_workspace_observer() -> Result<(), crate::Error> {
    if let Ok(mut installed) = NS_OBS_TOKEN.lock() {
        if *installed {
            return Ok(());
        }
        unsafe {
            let ws = NSWorkspace::sharedWorkspace();
            let center = ws.notificationCenter();
            let block = StackBlock::new(move |_notif: NonNull<NSNotification>| {
                trace!("active space did change");
                ns_emit_space_changed();
            })
            .copy();
            let _token = center.addObserverForName_object_queue_usingBlock(
                Some(NSWorkspaceActiveSpaceDidChangeNotification),
                None,
                None,
                &block,
            );
            // The notification center retains the block for the process lifetime.
            *installed = true;
            info!("NSWorkspace space observer installed");
        }
        Ok(())
    } else {
        Err(crate::Error::NsObserverPoisoned)
    }
}
