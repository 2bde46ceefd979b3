//! Shared helpers for the end-to-end handshake tests.
#![allow(dead_code)]

use std::thread;
use std::time::{Duration, Instant};

use kiosk_engine::Engine;
use kiosk_test_utils::FakeInputSource;

/// Pump the engine until `cond` holds, panicking after five seconds.
///
/// The simulation thread advances between pumps; the short sleep gives
/// it the slot without turning the test into a spin loop.
pub fn pump_until(
    engine: &Engine,
    source: &FakeInputSource,
    what: &str,
    mut cond: impl FnMut() -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        engine.pump(source);
        if cond() {
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
    panic!("timed out waiting for {what}");
}

/// Pump a fixed number of times with a short gap between pumps.
pub fn pump_n(engine: &Engine, source: &FakeInputSource, pumps: usize) {
    for _ in 0..pumps {
        engine.pump(source);
        thread::sleep(Duration::from_millis(2));
    }
}
