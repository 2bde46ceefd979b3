//! State shared between the engine facade, the simulation worker, and
//! the native callback dispatcher.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread::ThreadId;
use std::time::Instant;

use crate::clients::ClientMux;
use crate::config::EngineConfig;
use crate::host_queue::{HostAction, HostQueue};
use crate::input::InputAggregator;
use crate::native::FrameSource;
use crate::screen::Screen;
use crate::sync::FrameSync;

pub(crate) struct Shared {
    pub(crate) sync: FrameSync,
    pub(crate) input: InputAggregator,
    pub(crate) host_queue: HostQueue,
    pub(crate) clients: ClientMux,
    pub(crate) screen: Mutex<Screen>,
    /// Frame memory registered by the first draw callback; `None`
    /// until the native engine has handed over its buffer.
    pub(crate) frame_source: Mutex<Option<Box<dyn FrameSource>>>,
    /// The simulation thread was spawned at least once.
    pub(crate) initialized: AtomicBool,
    /// The native engine is currently running.
    pub(crate) started: AtomicBool,
    /// Cooperative stop flag for the simulation loop.
    pub(crate) stop: AtomicBool,
    pub(crate) last_exit_code: AtomicI32,
    /// Milliseconds the native engine last read from the clock.
    pub(crate) current_tick: AtomicU32,
    pub(crate) startup_millis: AtomicU64,
    pub(crate) title: Mutex<Option<String>>,
    /// Monotonic clock started when the native engine starts.
    pub(crate) clock: Mutex<Option<Instant>>,
    pub(crate) host_thread: ThreadId,
    pub(crate) sim_thread: Mutex<Option<ThreadId>>,
    pub(crate) config: EngineConfig,
}

// Compile-time assertion: Shared must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Shared>();
};

impl Shared {
    /// Build the shared state, recording the calling thread as the
    /// host thread.
    pub(crate) fn new(config: EngineConfig) -> Self {
        Self {
            sync: FrameSync::new(),
            input: InputAggregator::new(config.capture_mouse_y),
            host_queue: HostQueue::new(),
            clients: ClientMux::new(),
            screen: Mutex::new(Screen::default()),
            frame_source: Mutex::new(None),
            initialized: AtomicBool::new(false),
            started: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            last_exit_code: AtomicI32::new(0),
            current_tick: AtomicU32::new(0),
            startup_millis: AtomicU64::new(0),
            title: Mutex::new(None),
            clock: Mutex::new(None),
            host_thread: std::thread::current().id(),
            sim_thread: Mutex::new(None),
            config,
        }
    }

    pub(crate) fn is_host_thread(&self) -> bool {
        std::thread::current().id() == self.host_thread
    }

    /// Whether the current thread is the recorded simulation thread.
    /// `false` when no worker has run yet.
    pub(crate) fn is_sim_thread(&self) -> bool {
        *self.sim_thread.lock().unwrap() == Some(std::thread::current().id())
    }

    /// Record the calling thread as the simulation thread.
    pub(crate) fn record_sim_thread(&self) {
        *self.sim_thread.lock().unwrap() = Some(std::thread::current().id());
    }

    /// Start the native elapsed-time clock.
    pub(crate) fn start_clock(&self) {
        *self.clock.lock().unwrap() = Some(Instant::now());
    }

    /// Milliseconds since the native engine started, zero beforehand.
    pub(crate) fn elapsed_millis(&self) -> u32 {
        self.clock
            .lock()
            .unwrap()
            .map(|clock| clock.elapsed().as_millis() as u32)
            .unwrap_or(0)
    }

    pub(crate) fn schedule(&self, action: HostAction) {
        self.host_queue.push(action);
    }

    /// Re-arm everything a fresh worker expects. Only called while no
    /// worker is running.
    pub(crate) fn reset_for_start(&self) {
        self.stop.store(false, Ordering::Release);
        self.started.store(false, Ordering::Release);
        self.current_tick.store(0, Ordering::Release);
        self.startup_millis.store(0, Ordering::Release);
        self.sync.reset();
        *self.frame_source.lock().unwrap() = None;
        *self.clock.lock().unwrap() = None;
    }
}
