//! Manual-reset binary gate for one-directional thread handshakes.
//!
//! The frame protocol needs event semantics — a flag that stays set
//! until explicitly re-armed — rather than the one-shot wakeups a
//! channel or `Condvar`-with-predicate would give. [`Gate`] is the
//! smallest primitive with those semantics: `set` releases every
//! current and future waiter until `reset` re-arms the gate.
//!
//! No waits carry timeouts. A native engine that hangs mid-tick hangs
//! the simulation thread indefinitely; that is a documented property
//! of the protocol, not something this primitive papers over.

use std::sync::{Condvar, Mutex};

/// A manual-reset binary event.
pub struct Gate {
    state: Mutex<bool>,
    cond: Condvar,
}

// Compile-time assertion: Gate must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Gate>();
};

impl Gate {
    /// Create a gate in the given initial state.
    pub fn new(set: bool) -> Self {
        Self {
            state: Mutex::new(set),
            cond: Condvar::new(),
        }
    }

    /// Open the gate, releasing all current and future waiters.
    pub fn set(&self) {
        let mut state = self.state.lock().unwrap();
        *state = true;
        drop(state);
        self.cond.notify_all();
    }

    /// Close the gate. Waiters arriving after this call block.
    pub fn reset(&self) {
        *self.state.lock().unwrap() = false;
    }

    /// Block until the gate is set. Returns immediately if already set.
    pub fn wait(&self) {
        let mut state = self.state.lock().unwrap();
        while !*state {
            state = self.cond.wait(state).unwrap();
        }
    }

    /// Whether the gate is currently set.
    pub fn is_set(&self) -> bool {
        *self.state.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_returns_immediately_when_set() {
        let gate = Gate::new(true);
        gate.wait();
        assert!(gate.is_set());
    }

    #[test]
    fn reset_rearms_the_gate() {
        let gate = Gate::new(true);
        gate.reset();
        assert!(!gate.is_set());
        gate.set();
        assert!(gate.is_set());
    }

    #[test]
    fn set_releases_a_blocked_waiter() {
        let gate = Arc::new(Gate::new(false));
        let waiter_gate = Arc::clone(&gate);
        let waiter = thread::spawn(move || {
            waiter_gate.wait();
        });
        // Give the waiter a moment to block.
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());
        gate.set();
        waiter.join().expect("waiter should finish after set");
    }

    #[test]
    fn set_releases_multiple_waiters() {
        let gate = Arc::new(Gate::new(false));
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || gate.wait())
            })
            .collect();
        thread::sleep(Duration::from_millis(20));
        gate.set();
        for waiter in waiters {
            waiter.join().expect("all waiters release on set");
        }
    }
}
