//! Attachment-ordered client registry and notification fan-out.
//!
//! Clients are registered under monotonic [`ClientId`]s in an
//! insertion-ordered map; removal is always caller-driven via an
//! explicit detach, and a stale id is inert. Broadcasts run on the
//! host thread in attachment order; each hook is isolated with
//! `catch_unwind` so one misbehaving client cannot starve the rest.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use tracing::{debug, error};

use kiosk_core::client::{Client, ClientId};

/// The set of currently attached clients.
pub struct ClientMux {
    clients: Mutex<IndexMap<ClientId, Arc<dyn Client>>>,
}

// Compile-time assertion: ClientMux must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ClientMux>();
};

impl Default for ClientMux {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientMux {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(IndexMap::new()),
        }
    }

    /// Register a client, returning its handle.
    pub fn attach(&self, client: Arc<dyn Client>) -> ClientId {
        let id = ClientId::next();
        self.clients.lock().unwrap().insert(id, client);
        debug!(client = %id, "client attached");
        id
    }

    /// Remove a registration. Safe to call for an id that was never
    /// attached or is already gone; returns whether anything was removed.
    pub fn detach(&self, id: ClientId) -> bool {
        let removed = self.clients.lock().unwrap().shift_remove(&id).is_some();
        if removed {
            debug!(client = %id, "client detached");
        }
        removed
    }

    /// Detach everything without notifying anyone.
    ///
    /// Used on a fatal exit, where the exit broadcast already told every
    /// client what happened.
    pub fn clear(&self) {
        self.clients.lock().unwrap().clear();
    }

    /// Number of attached clients.
    pub fn len(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    /// Whether no clients are attached.
    pub fn is_empty(&self) -> bool {
        self.clients.lock().unwrap().is_empty()
    }

    /// Whether at least one attached client currently wants input.
    pub fn any_accepting_input(&self) -> bool {
        self.clients
            .lock()
            .unwrap()
            .values()
            .any(|client| client.accepting_input())
    }

    /// Snapshot the current registrations in attachment order.
    ///
    /// Broadcasts iterate the snapshot with the lock released, so a
    /// hook may attach or detach without deadlocking; it simply takes
    /// effect from the next broadcast on.
    fn snapshot(&self) -> Vec<(ClientId, Arc<dyn Client>)> {
        self.clients
            .lock()
            .unwrap()
            .iter()
            .map(|(id, client)| (*id, Arc::clone(client)))
            .collect()
    }

    fn broadcast(&self, hook: &str, invoke: impl Fn(&dyn Client)) {
        for (id, client) in self.snapshot() {
            let result = catch_unwind(AssertUnwindSafe(|| invoke(client.as_ref())));
            if result.is_err() {
                error!(client = %id, hook, "client hook panicked");
            }
        }
    }

    /// Notify every client of native startup and its resolution.
    pub fn on_init(&self, width: u32, height: u32) {
        self.broadcast("on_init", |client| client.on_init(width, height));
    }

    /// Notify every client that one simulation tick completed.
    pub fn on_tick(&self) {
        self.broadcast("on_tick", |client| client.on_tick());
    }

    /// Notify every client of a window-title change.
    pub fn on_window_title(&self, title: &str) {
        self.broadcast("on_window_title", |client| client.on_window_title(title));
    }

    /// Notify every client that the native engine exited.
    pub fn on_exit(&self, code: i32) {
        self.broadcast("on_exit", |client| client.on_exit(code));
    }

    /// Notify every client that a completed frame is ready to read.
    pub fn on_draw_frame(&self) {
        self.broadcast("on_draw_frame", |client| client.on_draw_frame());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Probe {
        accepting: AtomicBool,
        ticks: AtomicUsize,
        exits: AtomicUsize,
        panic_on_tick: AtomicBool,
    }

    impl Client for Probe {
        fn accepting_input(&self) -> bool {
            self.accepting.load(Ordering::SeqCst)
        }
        fn on_init(&self, _width: u32, _height: u32) {}
        fn on_tick(&self) {
            if self.panic_on_tick.load(Ordering::SeqCst) {
                panic!("client exploded");
            }
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
        fn on_exit(&self, _code: i32) {
            self.exits.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn accepting_input_tracks_attached_set() {
        let mux = ClientMux::new();
        assert!(!mux.any_accepting_input());

        let quiet = Arc::new(Probe::default());
        let focused = Arc::new(Probe::default());
        focused.accepting.store(true, Ordering::SeqCst);

        let quiet_id = mux.attach(quiet);
        assert!(!mux.any_accepting_input());

        let focused_id = mux.attach(focused);
        assert!(mux.any_accepting_input());

        mux.detach(focused_id);
        assert!(!mux.any_accepting_input());
        mux.detach(quiet_id);
        assert!(!mux.any_accepting_input());
    }

    #[test]
    fn detach_of_unknown_id_is_safe() {
        let mux = ClientMux::new();
        assert!(!mux.detach(ClientId(9999)));
        let id = mux.attach(Arc::new(Probe::default()));
        assert!(mux.detach(id));
        assert!(!mux.detach(id));
    }

    #[test]
    fn broadcast_order_is_attachment_order() {
        struct Ordered {
            tag: usize,
            log: Arc<Mutex<Vec<usize>>>,
        }
        impl Client for Ordered {
            fn accepting_input(&self) -> bool {
                false
            }
            fn on_init(&self, _w: u32, _h: u32) {}
            fn on_tick(&self) {
                self.log.lock().unwrap().push(self.tag);
            }
        }

        let mux = ClientMux::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in 0..3 {
            mux.attach(Arc::new(Ordered {
                tag,
                log: Arc::clone(&log),
            }));
        }
        mux.on_tick();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn panicking_client_does_not_block_the_rest() {
        let mux = ClientMux::new();
        let bomb = Arc::new(Probe::default());
        bomb.panic_on_tick.store(true, Ordering::SeqCst);
        let survivor = Arc::new(Probe::default());

        mux.attach(bomb);
        mux.attach(Arc::clone(&survivor) as Arc<dyn Client>);

        mux.on_tick();
        assert_eq!(survivor.ticks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clear_detaches_without_notifying() {
        let mux = ClientMux::new();
        let probe = Arc::new(Probe::default());
        mux.attach(Arc::clone(&probe) as Arc<dyn Client>);
        mux.clear();
        assert!(mux.is_empty());
        assert_eq!(probe.exits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn exit_broadcast_reaches_all_clients() {
        let mux = ClientMux::new();
        let a = Arc::new(Probe::default());
        let b = Arc::new(Probe::default());
        mux.attach(Arc::clone(&a) as Arc<dyn Client>);
        mux.attach(Arc::clone(&b) as Arc<dyn Client>);
        mux.on_exit(3);
        assert_eq!(a.exits.load(Ordering::SeqCst), 1);
        assert_eq!(b.exits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hook_may_detach_without_deadlock() {
        struct SelfDetacher {
            mux: Arc<ClientMux>,
            id: Mutex<Option<ClientId>>,
        }
        impl Client for SelfDetacher {
            fn accepting_input(&self) -> bool {
                false
            }
            fn on_init(&self, _w: u32, _h: u32) {}
            fn on_tick(&self) {
                if let Some(id) = *self.id.lock().unwrap() {
                    self.mux.detach(id);
                }
            }
        }

        let mux = Arc::new(ClientMux::new());
        let detacher = Arc::new(SelfDetacher {
            mux: Arc::clone(&mux),
            id: Mutex::new(None),
        });
        let id = mux.attach(Arc::clone(&detacher) as Arc<dyn Client>);
        *detacher.id.lock().unwrap() = Some(id);

        mux.on_tick();
        assert!(mux.is_empty());
    }
}
