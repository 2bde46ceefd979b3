//! Deferred-action queue for shipping work onto the host thread.
//!
//! The simulation thread (and anything else holding the engine handle)
//! enqueues closures; the host pump drains them once per host tick.
//! Ordering is FIFO and nothing is ever dropped while the queue lives.
//! Draining is not re-entrant: an action that enqueues another action
//! defers the new one to a later drain.

use crossbeam_channel::{Receiver, Sender};

/// A deferred unit of work for the host thread.
pub type HostAction = Box<dyn FnOnce() + Send + 'static>;

/// Unbounded FIFO of deferred host-thread actions.
///
/// `push` is safe from any thread; `drain` must only be called on the
/// host thread (the engine facade enforces this).
pub struct HostQueue {
    tx: Sender<HostAction>,
    rx: Receiver<HostAction>,
}

// Compile-time assertion: HostQueue must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<HostQueue>();
};

impl Default for HostQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl HostQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    /// Enqueue an action. Callable from any thread.
    pub fn push(&self, action: HostAction) {
        // The receiver lives as long as the queue, so this cannot fail.
        let _ = self.tx.send(action);
    }

    /// Execute every action enqueued before this call, in FIFO order.
    ///
    /// Actions are collected first and executed after, so an action
    /// that enqueues further work schedules it for the next drain, not
    /// this one. Returns the number of actions executed.
    pub fn drain(&self) -> usize {
        let pending: Vec<HostAction> = self.rx.try_iter().collect();
        let count = pending.len();
        for action in pending {
            action();
        }
        count
    }

    /// Number of actions currently waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
