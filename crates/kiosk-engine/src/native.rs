//! The seam to the opaque native engine.
//!
//! [`NativeEngine`] abstracts the two entry points the host controls
//! (start, tick); [`NativeHooks`] is the dispatcher behind the nine
//! callbacks the native engine invokes back into the host. The real
//! engine reaches the dispatcher through a fixed calling-convention
//! table (see `kiosk-native`); tests drive it directly.
//!
//! Thread-affinity contract: every callback executes on the simulation
//! thread. The dispatcher asserts this in debug builds and logs an
//! error in release builds — a violation means the native engine is
//! misbehaving, not that the host can recover.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use kiosk_core::error::StartError;
use kiosk_core::key::KeyEdge;
use kiosk_core::mouse::MouseReport;

use crate::shared::Shared;

/// Frame memory handed over by the native draw callback.
///
/// The engine copies through this trait exactly once per completed
/// frame, on the host thread, after the draw-acknowledged gate has
/// established the happens-before edge with the native writer.
pub trait FrameSource: Send {
    /// Total bytes in one frame (`width * height * 4`).
    fn byte_len(&self) -> usize;

    /// Copy the current frame contents into `dest`, replacing it.
    fn copy_into(&self, dest: &mut Vec<u8>);
}

/// The opaque, callback-driven engine being hosted.
///
/// Implementations own whatever linkage they need; the host only ever
/// calls these three methods, all on the simulation thread (except
/// [`locate`](NativeEngine::locate), which the facade may also use as
/// an availability probe).
pub trait NativeEngine: Send {
    /// Probe whether the native engine can run at all (shared library
    /// present, assets reachable). Called before the worker commits.
    fn locate(&self) -> Result<(), StartError>;

    /// Run native startup. Blocks until the engine is ready to tick;
    /// typically invokes [`NativeHooks::on_init`] before returning.
    fn start(&mut self, hooks: Arc<NativeHooks>, args: &[String]) -> Result<(), StartError>;

    /// Advance the engine by exactly one tick. May invoke any of the
    /// polling and draw callbacks synchronously.
    fn tick(&mut self);
}

/// Dispatcher for the callbacks the native engine makes into the host.
pub struct NativeHooks {
    shared: Arc<Shared>,
}

impl NativeHooks {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Assert the simulation-thread affinity contract for one entry.
    fn check_affinity(&self, entry: &str) {
        if !self.shared.is_sim_thread() {
            error!(entry, "native callback invoked off the simulation thread");
            debug_assert!(false, "native callback `{entry}` off the simulation thread");
        }
    }

    /// Native startup finished; the resolution is known.
    pub fn on_init(&self, width: u32, height: u32) {
        self.check_affinity("init");
        info!(width, height, "native engine initialized");
        self.shared.screen.lock().unwrap().set_resolution(width, height);
        let shared = Arc::clone(&self.shared);
        self.shared.schedule(Box::new(move || {
            shared.clients.on_init(width, height);
        }));
    }

    /// A frame finished drawing.
    ///
    /// The very first invocation only registers the frame memory and
    /// returns without signaling; subsequent invocations, and only
    /// while a tick is running, hand the frame to the host.
    pub fn on_draw_frame(&self, source: Box<dyn FrameSource>) {
        self.check_affinity("draw_frame");
        let mut slot = self.shared.frame_source.lock().unwrap();
        if slot.is_none() {
            debug!(bytes = source.byte_len(), "frame buffer registered");
            *slot = Some(source);
            return;
        }
        drop(slot);
        self.shared.sync.mark_draw_pending();
    }

    /// Sleep the simulation thread for the requested interval.
    pub fn sleep(&self, millis: u32) {
        if self.shared.is_host_thread() {
            error!("refusing to sleep the host thread on the native engine's behalf");
            return;
        }
        self.check_affinity("sleep");
        std::thread::sleep(std::time::Duration::from_millis(u64::from(millis)));
    }

    /// Milliseconds elapsed since native startup.
    pub fn elapsed_millis(&self) -> u32 {
        self.check_affinity("elapsed_millis");
        let millis = self.shared.elapsed_millis();
        self.shared.current_tick.store(millis, Ordering::Release);
        millis
    }

    /// Pop one pending key edge, or `None` when the sample is drained.
    pub fn poll_key(&self) -> Option<KeyEdge> {
        self.check_affinity("poll_key");
        self.shared.input.poll_key_edge()
    }

    /// Consume the accumulated mouse state.
    pub fn poll_mouse(&self) -> MouseReport {
        self.check_affinity("poll_mouse");
        self.shared.input.poll_mouse()
    }

    /// The engine renamed its window.
    pub fn set_window_title(&self, title: &str) {
        self.check_affinity("set_window_title");
        info!(title, "window title changed");
        let owned = title.to_owned();
        *self.shared.title.lock().unwrap() = Some(owned.clone());
        let shared = Arc::clone(&self.shared);
        self.shared.schedule(Box::new(move || {
            shared.clients.on_window_title(&owned);
        }));
    }

    /// The engine exited with the given code.
    ///
    /// Drops the started flag, raises the cooperative stop flag, and
    /// marshals the exit notification to the host thread. A non-zero
    /// code also clears the registry — those clients are gone until
    /// the engine is started again.
    pub fn on_exit(&self, code: i32) {
        self.check_affinity("exit");
        warn!(code, "native engine exited");
        self.shared.last_exit_code.store(code, Ordering::Release);
        self.shared.started.store(false, Ordering::Release);
        self.shared.stop.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        self.shared.schedule(Box::new(move || {
            shared.clients.on_exit(code);
            if code != 0 {
                shared.clients.clear();
            }
        }));
    }

    /// A log line from inside the native engine.
    pub fn log_line(&self, line: &str) {
        info!(target: "kiosk::native", "{line}");
    }
}
