//! Thread-safe key/mouse aggregation between host ticks and engine polls.
//!
//! The host thread produces (samples devices once per host tick); the
//! simulation thread consumes (the native engine polls edges and mouse
//! state mid-tick). One mutex guards all of it: without the lock the
//! two sides race on the edge sets.
//!
//! Key edges are derived by diffing each sample against the held-set,
//! so a key held across consecutive samples produces no edges. Typed
//! printable characters fold in as synthetic single-tick codes — they
//! are marked held for one sample and, never appearing in the scan
//! table, read as released on the next.

use std::sync::Mutex;

use indexmap::IndexSet;
use smallvec::SmallVec;

use kiosk_core::key::{HostKey, KeyCode, KeyEdge, DOUBLED_KEYS};
use kiosk_core::mouse::{MouseButton, MouseButtons, MouseReport};

/// Host-side device access, polled by the sampler once per host tick.
///
/// Implemented by whatever windowing/input layer hosts the engine; the
/// engine itself never touches a device directly.
pub trait InputSource {
    /// Level of one physical key.
    fn key_down(&self, key: HostKey) -> bool;

    /// Whether any key at all is currently down. Lets the sampler skip
    /// the full table scan on quiet ticks.
    fn any_key_down(&self) -> bool;

    /// Printable characters typed since the last sample.
    fn typed_chars(&self) -> SmallVec<[u8; 8]>;

    /// Mouse movement since the last sample, in host axis units.
    fn mouse_axes(&self) -> (f32, f32);

    /// Scroll wheel movement since the last sample.
    fn wheel_delta(&self) -> f32;

    /// Level of one mouse button.
    fn button_down(&self, button: MouseButton) -> bool;
}

/// Everything behind the input mutex.
#[derive(Default)]
struct InputState {
    pressed: IndexSet<KeyCode>,
    held: IndexSet<KeyCode>,
    released: IndexSet<KeyCode>,
    mouse_dx: f32,
    mouse_dy: f32,
    wheel: f32,
    buttons: MouseButtons,
    ignore_left_click: bool,
}

/// Aggregates discrete key edges and continuous mouse deltas between
/// host sampling and simulation-thread consumption.
pub struct InputAggregator {
    state: Mutex<InputState>,
    capture_mouse_y: bool,
}

// Compile-time assertion: InputAggregator must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<InputAggregator>();
};

impl InputAggregator {
    /// Create an empty aggregator.
    ///
    /// With `capture_mouse_y` false (the default configuration),
    /// vertical mouse movement is discarded: on an in-world screen it
    /// maps to forward/back movement, which plays badly.
    pub fn new(capture_mouse_y: bool) -> Self {
        Self {
            state: Mutex::new(InputState::default()),
            capture_mouse_y,
        }
    }

    /// Scan the full key table once and fold the result into the edge
    /// sets. Host thread only.
    pub fn sample_keys(&self, source: &dyn InputSource) {
        let mut state = self.state.lock().unwrap();

        // Assume everything held was released; the scan below rescues
        // keys that are still down.
        let held: Vec<KeyCode> = state.held.iter().copied().collect();
        for code in held {
            state.released.insert(code);
        }
        if !source.any_key_down() {
            state.held.clear();
            return;
        }

        for &key in HostKey::ALL {
            if !source.key_down(key) {
                continue;
            }
            let code = key.to_code();
            if state.held.insert(code) {
                state.pressed.insert(code);
            }
            // Alternate binds map distinct physical keys onto one code;
            // a code rescued here must not count as released this tick,
            // or the input gets dropped or spammed.
            state.released.shift_remove(&code);
        }

        for byte in source.typed_chars() {
            let byte = byte.to_ascii_lowercase();
            if DOUBLED_KEYS.contains(&byte) {
                continue;
            }
            let code = KeyCode::from_char(byte);
            if state.held.insert(code) {
                state.pressed.insert(code);
            }
        }

        let pressed = state.pressed.clone();
        state.released.retain(|code| !pressed.contains(code));
        let released = state.released.clone();
        state.held.retain(|code| !released.contains(code));
    }

    /// Accumulate mouse deltas and sample button levels. Host thread only.
    pub fn collect_mouse(&self, source: &dyn InputSource) {
        let mut state = self.state.lock().unwrap();

        let (dx, dy) = source.mouse_axes();
        state.mouse_dx += dx;
        if self.capture_mouse_y {
            state.mouse_dy += dy;
        }
        state.wheel += source.wheel_delta();

        if state.ignore_left_click {
            state.buttons.left = false;
            if !source.button_down(MouseButton::Left) {
                state.ignore_left_click = false;
            }
        } else {
            state.buttons.left = source.button_down(MouseButton::Left);
        }
        state.buttons.right = source.button_down(MouseButton::Right);
        state.buttons.middle = source.button_down(MouseButton::Middle);
    }

    /// Suppress the left button until its next physical release.
    ///
    /// Used when a viewer grabs focus with a click, so the click that
    /// granted focus does not also fire into the game.
    pub fn ignore_next_left_click(&self) {
        self.state.lock().unwrap().ignore_left_click = true;
    }

    /// Pop one pending key edge, presses before releases.
    /// Simulation thread only.
    pub fn poll_key_edge(&self) -> Option<KeyEdge> {
        let mut state = self.state.lock().unwrap();
        if let Some(code) = state.pressed.shift_remove_index(0) {
            return Some(KeyEdge {
                code,
                pressed: true,
            });
        }
        if let Some(code) = state.released.shift_remove_index(0) {
            return Some(KeyEdge {
                code,
                pressed: false,
            });
        }
        None
    }

    /// Exchange the accumulated mouse state for a quiescent one.
    /// Simulation thread only.
    ///
    /// Deltas are consumed exactly once; the accumulated wheel motion
    /// collapses to a signed unit step; buttons are reported at level.
    pub fn poll_mouse(&self) -> MouseReport {
        let mut state = self.state.lock().unwrap();
        let report = MouseReport {
            delta_x: state.mouse_dx as i32,
            delta_y: state.mouse_dy as i32,
            wheel: unit_step(state.wheel),
            buttons: state.buttons,
        };
        state.mouse_dx = 0.0;
        state.mouse_dy = 0.0;
        state.wheel = 0.0;
        report
    }
}

/// Collapse an accumulated wheel delta to `-1`, `0`, or `1`.
fn unit_step(value: f32) -> i32 {
    if value.abs() < f32::EPSILON {
        0
    } else if value > 0.0 {
        1
    } else {
        -1
    }
}
