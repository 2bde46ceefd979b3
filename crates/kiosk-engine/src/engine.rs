//! The engine facade: one explicitly constructed handle per hosted
//! engine, owned by the composition root and threaded through to
//! whatever needs it.
//!
//! The thread that constructs the [`Engine`] becomes the **host
//! thread**: the only thread allowed to pump, and the thread on which
//! every client notification is delivered. The facade composes the
//! frame synchronizer, input aggregator, deferred-action queue, and
//! client multiplexer, and owns the simulation worker's join handle.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use kiosk_core::client::{Client, ClientId};

use crate::config::{ConfigError, EngineConfig};
use crate::host_queue::HostAction;
use crate::input::InputSource;
use crate::native::NativeEngine;
use crate::screen::Screen;
use crate::shared::Shared;
use crate::sync::{warn_sim_thread_pause, FrameState};
use crate::worker;

/// Point-in-time view of the engine's lifecycle.
#[derive(Clone, Debug)]
pub struct EngineStatus {
    /// The simulation thread was spawned at least once.
    pub initialized: bool,
    /// The native engine is currently running.
    pub started: bool,
    /// The simulation loop is not paused.
    pub running: bool,
    /// Number of attached clients.
    pub clients: usize,
    /// Milliseconds the native engine last read from its clock.
    pub current_tick: u32,
    /// Exit code from the most recent native exit, zero otherwise.
    pub last_exit_code: i32,
    /// Wall milliseconds native startup took, zero until measured.
    pub startup_millis: u64,
    /// Frame resolution, `(0, 0)` until the init callback arrives.
    pub resolution: (u32, u32),
    /// Current window title, if the engine ever set one.
    pub window_title: Option<String>,
    /// Where the current frame is in its lifecycle.
    pub frame_state: FrameState,
}

/// Idle worker bookkeeping: either a join handle for a live or
/// recently-finished thread, or the recovered native engine awaiting
/// the next start.
struct WorkerSlot {
    handle: Option<JoinHandle<Box<dyn NativeEngine>>>,
    idle_native: Option<Box<dyn NativeEngine>>,
}

/// The per-process entry point for one hosted native engine.
pub struct Engine {
    shared: Arc<Shared>,
    worker: Mutex<WorkerSlot>,
}

// Compile-time assertion: Engine must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Engine>();
};

impl Engine {
    /// Build an engine around a native implementation.
    ///
    /// Nothing is spawned yet; the worker starts on the first attach
    /// or an explicit [`start_once`](Engine::start_once). The calling
    /// thread is recorded as the host thread.
    pub fn new(config: EngineConfig, native: Box<dyn NativeEngine>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared::new(config)),
            worker: Mutex::new(WorkerSlot {
                handle: None,
                idle_native: Some(native),
            }),
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start the simulation worker if it is not already running.
    ///
    /// A no-op while a worker is alive. After a native exit the worker
    /// thread is joined here, its engine recovered, and a fresh worker
    /// spawned — this is the only restart path.
    pub fn start_once(&self) {
        let mut slot = self.worker.lock().unwrap();
        if let Some(handle) = &slot.handle {
            let stopping = self.shared.stop.load(Ordering::Acquire);
            if !handle.is_finished() && !stopping {
                debug!("start_once: simulation thread already running");
                return;
            }
            // The worker has stopped (or its stop flag is raised and it
            // is about to). Join it and recover the native engine; the
            // loop never blocks on a gate once the flag is set, so this
            // join is prompt.
            match slot.handle.take().map(JoinHandle::join) {
                Some(Ok(native)) => slot.idle_native = Some(native),
                Some(Err(_)) => error!("simulation thread panicked; engine unrecoverable"),
                None => {}
            }
        }
        let Some(native) = slot.idle_native.take() else {
            error!("no native engine available to start");
            return;
        };

        self.shared.reset_for_start();
        self.shared.initialized.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(self.shared.config.thread_name.clone())
            .spawn(move || worker::run(shared, native))
            .expect("failed to spawn simulation thread");
        slot.handle = Some(handle);
        info!(
            thread = %self.shared.config.thread_name,
            "simulation thread started"
        );
    }

    /// Whether the native engine can currently be located (or is
    /// already running). Lets prospective clients bail out before
    /// attaching to an engine that can never start.
    pub fn native_available(&self) -> bool {
        let slot = self.worker.lock().unwrap();
        match &slot.idle_native {
            Some(native) => native.locate().is_ok(),
            None => self.shared.last_exit_code.load(Ordering::Acquire) == 0,
        }
    }

    // ── Clients ──────────────────────────────────────────────────

    /// Register a client and resume the simulation.
    ///
    /// The first attach ever also starts the worker. Attaching from a
    /// thread other than the host thread is a contract violation; it
    /// is logged and tolerated because the registry itself is locked.
    pub fn attach(&self, client: Arc<dyn Client>) -> ClientId {
        if !self.shared.is_host_thread() {
            error!("clients must attach from the host thread");
        }
        if !self.shared.initialized.load(Ordering::Acquire) {
            self.start_once();
        }
        let id = self.shared.clients.attach(client);
        self.shared.sync.set_paused(false);
        id
    }

    /// Remove a registration. Safe for ids that were never attached.
    ///
    /// Detaching the last client pauses the simulation unless the
    /// configuration says to persist without viewers.
    pub fn detach(&self, id: ClientId) -> bool {
        if !self.shared.is_host_thread() {
            error!("clients must detach from the host thread");
        }
        let removed = self.shared.clients.detach(id);
        if removed
            && self.shared.clients.is_empty()
            && !self.shared.config.persist_without_clients
        {
            info!("last client detached; pausing simulation");
            self.shared.sync.set_paused(true);
        }
        removed
    }

    // ── The per-host-tick pump ───────────────────────────────────

    /// Advance the host side of the frame protocol. Call exactly once
    /// per host tick, on the host thread.
    ///
    /// Drains the deferred-action queue, samples input when any
    /// attached client wants it, grants the simulation thread its
    /// input window, and completes the draw handshake by copying the
    /// finished frame and notifying clients.
    pub fn pump(&self, source: &dyn InputSource) {
        if !self.shared.is_host_thread() {
            error!("pump must run on the host thread");
            return;
        }

        self.shared.host_queue.drain();

        if self.shared.clients.any_accepting_input() {
            self.shared.input.sample_keys(source);
            self.shared.input.collect_mouse(source);
        }

        self.shared.sync.grant_input();

        if self.shared.sync.take_draw() {
            self.copy_frame();
            self.shared.clients.on_draw_frame();
            self.shared.sync.ack_draw();
        }
    }

    /// Copy the registered frame memory into the engine-owned screen.
    fn copy_frame(&self) {
        let slot = self.shared.frame_source.lock().unwrap();
        let Some(frame) = slot.as_ref() else {
            // The native engine signaled a draw without ever providing
            // a buffer. The protocol stays live; the frame is lost.
            error!("draw completed before a frame buffer was registered");
            return;
        };
        let mut screen = self.shared.screen.lock().unwrap();
        let expected = screen.frame_len();
        frame.copy_into(screen.pixels_mut());
        if screen.pixels().len() != expected {
            debug!(
                got = screen.pixels().len(),
                expected, "frame copy length differs from resolution"
            );
        }
    }

    // ── Deferred actions ─────────────────────────────────────────

    /// Enqueue work for the next pump. Callable from any thread.
    pub fn schedule_on_host(&self, action: HostAction) {
        self.shared.schedule(action);
    }

    /// Run `action` immediately when already on the host thread, else
    /// defer it to the next pump.
    pub fn run_on_host(&self, action: HostAction) {
        if self.shared.is_host_thread() {
            action();
        } else {
            self.schedule_on_host(action);
        }
    }

    // ── Pause ────────────────────────────────────────────────────

    /// Pause or resume the simulation loop.
    ///
    /// Expected caller is the host thread; toggling from the
    /// simulation thread still works (the gate is thread-agnostic)
    /// but is logged as a misuse.
    pub fn set_paused(&self, paused: bool) {
        if self.shared.is_sim_thread() {
            warn_sim_thread_pause();
        }
        self.shared.sync.set_paused(paused);
    }

    /// Suppress the left mouse button until its next physical release.
    pub fn ignore_next_left_click(&self) {
        self.shared.input.ignore_next_left_click();
    }

    // ── Introspection ────────────────────────────────────────────

    /// Whether the native engine is currently running.
    pub fn started(&self) -> bool {
        self.shared.started.load(Ordering::Acquire)
    }

    /// Current window title, if the engine ever set one.
    pub fn window_title(&self) -> Option<String> {
        self.shared.title.lock().unwrap().clone()
    }

    /// Read access to the last completed frame.
    pub fn screen(&self) -> MutexGuard<'_, Screen> {
        self.shared.screen.lock().unwrap()
    }

    /// Point-in-time lifecycle snapshot.
    pub fn status(&self) -> EngineStatus {
        let screen = self.shared.screen.lock().unwrap();
        EngineStatus {
            initialized: self.shared.initialized.load(Ordering::Acquire),
            started: self.shared.started.load(Ordering::Acquire),
            running: self.shared.sync.is_running(),
            clients: self.shared.clients.len(),
            current_tick: self.shared.current_tick.load(Ordering::Acquire),
            last_exit_code: self.shared.last_exit_code.load(Ordering::Acquire),
            startup_millis: self.shared.startup_millis.load(Ordering::Acquire),
            resolution: (screen.width(), screen.height()),
            window_title: self.shared.title.lock().unwrap().clone(),
            frame_state: self.shared.sync.state(),
        }
    }
}
