//! The two-thread frame handshake: state machine plus gates.
//!
//! Exactly one frame is ever in flight. The simulation thread advances
//! one state step per loop iteration and blocks on a gate whenever the
//! host owes it something (sampled input, a draw acknowledgement); the
//! host pump flips the states that are its to flip, once per host
//! tick. Each state has a single writer by construction:
//!
//! ```text
//! sim:  FrameStart -> GatherInput          (re-arms input gate)
//! host: GatherInput -> DoGameTick          (input sampled, gate set)
//! sim:  DoGameTick -> WaitForDraw          (draw fired mid-tick)
//! sim:  DoGameTick -> FrameEnd             (tick produced no draw)
//! host: WaitForDraw -> FrameEnd            (frame copied, gate set)
//! sim:  FrameEnd -> FrameStart             (tick notification)
//! ```
//!
//! A separate pause gate throttles the top of every simulation loop
//! iteration without touching frame-state progress.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::warn;

use crate::gate::Gate;

/// Where the current frame is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameState {
    /// A fresh frame is about to begin.
    FrameStart = 0,
    /// The simulation thread is waiting for this tick's input sample.
    GatherInput = 1,
    /// The native engine is running exactly one tick.
    DoGameTick = 2,
    /// A draw fired during the tick; waiting for the host to copy it.
    WaitForDraw = 3,
    /// The cycle is complete; the tick notification is owed.
    FrameEnd = 4,
}

impl FrameState {
    fn from_u8(value: u8) -> FrameState {
        match value {
            0 => FrameState::FrameStart,
            1 => FrameState::GatherInput,
            2 => FrameState::DoGameTick,
            3 => FrameState::WaitForDraw,
            _ => FrameState::FrameEnd,
        }
    }
}

/// What the simulation loop should do after one [`FrameSync::sim_step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimStep {
    /// Nothing beyond the state bookkeeping already done.
    Continue,
    /// Run exactly one native tick, then call [`FrameSync::finish_tick`].
    RunTick,
    /// Deliver the tick notification for the completed frame.
    NotifyTick,
}

/// The handshake protocol between the host pump and the simulation loop.
pub struct FrameSync {
    state: AtomicU8,
    input_ready: Gate,
    draw_done: Gate,
    running: Gate,
}

// Compile-time assertion: FrameSync must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<FrameSync>();
};

impl Default for FrameSync {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSync {
    /// Create a synchronizer at `FrameStart`, unpaused.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(FrameState::FrameStart as u8),
            input_ready: Gate::new(false),
            draw_done: Gate::new(false),
            running: Gate::new(true),
        }
    }

    /// The current frame state.
    pub fn state(&self) -> FrameState {
        FrameState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: FrameState) {
        self.state.store(state as u8, Ordering::Release);
    }

    // ── Simulation side ──────────────────────────────────────────

    /// Block while paused. Called at the top of every loop iteration.
    pub fn wait_running(&self) {
        self.running.wait();
    }

    /// Advance one state step on the simulation thread.
    ///
    /// Blocks on the input gate in `GatherInput` and on the draw gate
    /// in `WaitForDraw`; otherwise returns immediately with the work
    /// the caller owes the protocol.
    pub fn sim_step(&self) -> SimStep {
        match self.state() {
            FrameState::FrameStart => {
                // Re-arm before publishing the state so the host cannot
                // grant input in the gap and have the grant swallowed.
                self.input_ready.reset();
                self.set_state(FrameState::GatherInput);
                SimStep::Continue
            }
            FrameState::GatherInput => {
                self.input_ready.wait();
                SimStep::Continue
            }
            FrameState::DoGameTick => SimStep::RunTick,
            FrameState::WaitForDraw => {
                self.draw_done.wait();
                SimStep::Continue
            }
            FrameState::FrameEnd => {
                self.set_state(FrameState::FrameStart);
                SimStep::NotifyTick
            }
        }
    }

    /// Close out a native tick that produced no draw.
    ///
    /// Must be called after the tick returns; if a draw fired the state
    /// already moved to `WaitForDraw` and this is a no-op.
    pub fn finish_tick(&self) {
        if self.state() == FrameState::DoGameTick {
            self.set_state(FrameState::FrameEnd);
        }
    }

    /// Record a draw callback fired by the native engine mid-tick.
    ///
    /// Only honored while the tick is actually running; returns whether
    /// the frame entered `WaitForDraw`.
    pub fn mark_draw_pending(&self) -> bool {
        if self.state() == FrameState::DoGameTick {
            self.draw_done.reset();
            self.set_state(FrameState::WaitForDraw);
            true
        } else {
            false
        }
    }

    // ── Host side ────────────────────────────────────────────────

    /// Hand the simulation thread this tick's input sample.
    ///
    /// Returns `true` when the frame was in `GatherInput` and is now
    /// ticking. The caller must have sampled input beforehand.
    pub fn grant_input(&self) -> bool {
        if self.state() == FrameState::GatherInput {
            self.set_state(FrameState::DoGameTick);
            self.input_ready.set();
            true
        } else {
            false
        }
    }

    /// Claim a completed draw for copying.
    ///
    /// Returns `true` when the frame was in `WaitForDraw`; the caller
    /// copies the frame buffer and then calls [`FrameSync::ack_draw`].
    pub fn take_draw(&self) -> bool {
        if self.state() == FrameState::WaitForDraw {
            self.set_state(FrameState::FrameEnd);
            true
        } else {
            false
        }
    }

    /// Release the simulation thread after the frame copy.
    ///
    /// This is the happens-before edge that makes the copy safe: the
    /// native engine only writes the frame memory again after the gate
    /// fires.
    pub fn ack_draw(&self) {
        self.draw_done.set();
    }

    // ── Either side ──────────────────────────────────────────────

    /// Pause or resume the simulation loop.
    ///
    /// Toggling never perturbs frame-state progress, only its cadence.
    /// The native engine's elapsed-time source keeps advancing across a
    /// pause, so its tick counter jumps forward on resume; that is a
    /// known property of the protocol, deliberately preserved.
    pub fn set_paused(&self, paused: bool) {
        if paused {
            self.running.reset();
        } else {
            self.running.set();
        }
    }

    /// Whether the simulation loop is currently allowed to run.
    pub fn is_running(&self) -> bool {
        self.running.is_set()
    }

    /// Return to `FrameStart` with all gates re-armed and the pause
    /// gate open. Only sound while no simulation thread is running.
    pub(crate) fn reset(&self) {
        self.set_state(FrameState::FrameStart);
        self.input_ready.reset();
        self.draw_done.reset();
        self.running.set();
    }
}

/// Log (without preventing) a pause toggle from the simulation thread.
///
/// The pause gate behaves correctly from either thread; the caller is
/// still warned because toggling from the simulation loop usually means
/// a client hook ran on the wrong side of the boundary.
pub(crate) fn warn_sim_thread_pause() {
    warn!("set_paused called from the simulation thread");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cycle_without_draw() {
        let sync = FrameSync::new();
        assert_eq!(sync.state(), FrameState::FrameStart);

        assert_eq!(sync.sim_step(), SimStep::Continue);
        assert_eq!(sync.state(), FrameState::GatherInput);

        assert!(sync.grant_input());
        assert_eq!(sync.state(), FrameState::DoGameTick);

        // GatherInput's wait has already been satisfied by the grant.
        assert_eq!(sync.sim_step(), SimStep::RunTick);
        sync.finish_tick();
        assert_eq!(sync.state(), FrameState::FrameEnd);

        assert_eq!(sync.sim_step(), SimStep::NotifyTick);
        assert_eq!(sync.state(), FrameState::FrameStart);
    }

    #[test]
    fn draw_inserts_wait_for_draw() {
        let sync = FrameSync::new();
        sync.sim_step(); // FrameStart -> GatherInput
        sync.grant_input();
        assert_eq!(sync.sim_step(), SimStep::RunTick);

        // The native tick fires a draw.
        assert!(sync.mark_draw_pending());
        assert_eq!(sync.state(), FrameState::WaitForDraw);
        sync.finish_tick(); // no-op: state is no longer DoGameTick
        assert_eq!(sync.state(), FrameState::WaitForDraw);

        assert!(sync.take_draw());
        assert_eq!(sync.state(), FrameState::FrameEnd);
        sync.ack_draw();

        assert_eq!(sync.sim_step(), SimStep::NotifyTick);
        assert_eq!(sync.state(), FrameState::FrameStart);
    }

    #[test]
    fn draw_outside_tick_is_ignored() {
        let sync = FrameSync::new();
        assert!(!sync.mark_draw_pending());
        assert_eq!(sync.state(), FrameState::FrameStart);
    }

    #[test]
    fn grant_input_outside_gather_is_refused() {
        let sync = FrameSync::new();
        assert!(!sync.grant_input());
        assert_eq!(sync.state(), FrameState::FrameStart);
    }

    #[test]
    fn take_draw_outside_wait_is_refused() {
        let sync = FrameSync::new();
        assert!(!sync.take_draw());
    }

    #[test]
    fn pause_gate_is_independent_of_frame_state() {
        let sync = FrameSync::new();
        assert!(sync.is_running());
        sync.set_paused(true);
        assert!(!sync.is_running());
        // Frame state untouched by the pause toggle.
        assert_eq!(sync.state(), FrameState::FrameStart);
        sync.set_paused(false);
        assert!(sync.is_running());
    }

    #[test]
    fn repeated_cycles_observe_canonical_order() {
        let sync = FrameSync::new();
        for cycle in 0..3 {
            let draws = cycle % 2 == 0;
            assert_eq!(sync.state(), FrameState::FrameStart);
            sync.sim_step();
            assert_eq!(sync.state(), FrameState::GatherInput);
            sync.grant_input();
            assert_eq!(sync.sim_step(), SimStep::RunTick);
            if draws {
                sync.mark_draw_pending();
                assert_eq!(sync.state(), FrameState::WaitForDraw);
                sync.take_draw();
                sync.ack_draw();
            } else {
                sync.finish_tick();
            }
            assert_eq!(sync.state(), FrameState::FrameEnd);
            assert_eq!(sync.sim_step(), SimStep::NotifyTick);
        }
    }
}
