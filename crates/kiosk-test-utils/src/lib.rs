//! Test utilities and scripted fakes for Kiosk development.
//!
//! Provides a scriptable [`NativeEngine`] implementation
//! ([`ScriptedEngine`]), a mutable [`InputSource`]
//! ([`FakeInputSource`]), and a [`Client`] that records every
//! notification it receives ([`RecordingClient`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use smallvec::SmallVec;

use kiosk_core::client::Client;
use kiosk_core::error::StartError;
use kiosk_core::key::{HostKey, KeyEdge};
use kiosk_core::mouse::{MouseButton, MouseReport};
use kiosk_engine::input::InputSource;
use kiosk_engine::native::{FrameSource, NativeEngine, NativeHooks};

// ── Frame source ─────────────────────────────────────────────────

/// Frame memory backed by a shared `Vec`, standing in for the raw
/// buffer a real native engine would expose.
pub struct SharedFrameSource {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedFrameSource {
    pub fn new(buffer: Arc<Mutex<Vec<u8>>>) -> Self {
        Self { buffer }
    }
}

impl FrameSource for SharedFrameSource {
    fn byte_len(&self) -> usize {
        self.buffer.lock().unwrap().len()
    }

    fn copy_into(&self, dest: &mut Vec<u8>) {
        let buffer = self.buffer.lock().unwrap();
        dest.clear();
        dest.extend_from_slice(&buffer);
    }
}

// ── Scripted native engine ───────────────────────────────────────

/// Shared observation points into a [`ScriptedEngine`] that has been
/// moved into an engine. Grab with [`ScriptedEngine::probes`] first.
#[derive(Clone, Default)]
pub struct ScriptProbes {
    pub ticks: Arc<AtomicUsize>,
    pub keys_seen: Arc<Mutex<Vec<KeyEdge>>>,
    pub mouse_seen: Arc<Mutex<Vec<MouseReport>>>,
    pub frame: Arc<Mutex<Vec<u8>>>,
}

/// A scriptable stand-in for the opaque native engine.
///
/// `start` reports the configured resolution and registers the frame
/// buffer; each `tick` reads the clock, drains key edges, polls the
/// mouse, and (by default) fires one draw callback. Scripted exits
/// and title changes fire on their configured tick numbers.
pub struct ScriptedEngine {
    width: u32,
    height: u32,
    missing: bool,
    draws: bool,
    exit_at: Option<(usize, i32)>,
    title_at: Option<(usize, String)>,
    hooks: Option<Arc<NativeHooks>>,
    probes: ScriptProbes,
}

impl ScriptedEngine {
    pub fn new(width: u32, height: u32) -> Self {
        let probes = ScriptProbes::default();
        *probes.frame.lock().unwrap() =
            vec![0u8; width as usize * height as usize * kiosk_engine::BYTES_PER_PIXEL];
        Self {
            width,
            height,
            missing: false,
            draws: true,
            exit_at: None,
            title_at: None,
            hooks: None,
            probes,
        }
    }

    /// Make `locate` fail as if the shared library were absent.
    pub fn missing(mut self) -> Self {
        self.missing = true;
        self
    }

    /// Suppress the per-tick draw callback.
    pub fn without_draws(mut self) -> Self {
        self.draws = false;
        self
    }

    /// Report a native exit with `code` at the start of tick `tick`
    /// (1-based), instead of ticking.
    pub fn exit_at(mut self, tick: usize, code: i32) -> Self {
        self.exit_at = Some((tick, code));
        self
    }

    /// Change the window title during tick `tick` (1-based).
    pub fn title_at(mut self, tick: usize, title: &str) -> Self {
        self.title_at = Some((tick, title.to_owned()));
        self
    }

    /// Observation points that stay valid after the engine is moved.
    pub fn probes(&self) -> ScriptProbes {
        self.probes.clone()
    }

    fn frame_source(&self) -> Box<dyn FrameSource> {
        Box::new(SharedFrameSource::new(Arc::clone(&self.probes.frame)))
    }
}

impl NativeEngine for ScriptedEngine {
    fn locate(&self) -> Result<(), StartError> {
        if self.missing {
            Err(StartError::MissingLibrary {
                path: PathBuf::from("retrocore.so"),
            })
        } else {
            Ok(())
        }
    }

    fn start(&mut self, hooks: Arc<NativeHooks>, _args: &[String]) -> Result<(), StartError> {
        hooks.on_init(self.width, self.height);
        // First draw call only registers the frame memory.
        hooks.on_draw_frame(self.frame_source());
        self.hooks = Some(hooks);
        Ok(())
    }

    fn tick(&mut self) {
        let hooks = self
            .hooks
            .as_ref()
            .expect("tick before start")
            .clone();
        let tick = self.probes.ticks.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some((at, code)) = self.exit_at {
            if tick >= at {
                hooks.on_exit(code);
                return;
            }
        }

        let _elapsed = hooks.elapsed_millis();
        while let Some(edge) = hooks.poll_key() {
            self.probes.keys_seen.lock().unwrap().push(edge);
        }
        self.probes
            .mouse_seen
            .lock()
            .unwrap()
            .push(hooks.poll_mouse());

        if let Some((at, title)) = &self.title_at {
            if tick == *at {
                hooks.set_window_title(title);
            }
        }

        if self.draws {
            hooks.on_draw_frame(self.frame_source());
        }
    }
}

// ── Fake input source ────────────────────────────────────────────

#[derive(Default)]
struct FakeInputState {
    down: HashSet<HostKey>,
    typed: Vec<u8>,
    axes: (f32, f32),
    wheel: f32,
    left: bool,
    right: bool,
    middle: bool,
}

/// A mutable [`InputSource`] for driving the pump from tests.
///
/// Axis, wheel, and typed-character state is consumed by the next
/// sample, matching how a real device layer reports per-tick deltas.
#[derive(Default)]
pub struct FakeInputSource {
    state: Mutex<FakeInputState>,
}

impl FakeInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, key: HostKey) {
        self.state.lock().unwrap().down.insert(key);
    }

    pub fn release(&self, key: HostKey) {
        self.state.lock().unwrap().down.remove(&key);
    }

    pub fn release_all(&self) {
        self.state.lock().unwrap().down.clear();
    }

    pub fn type_chars(&self, chars: &[u8]) {
        self.state.lock().unwrap().typed.extend_from_slice(chars);
    }

    pub fn move_mouse(&self, dx: f32, dy: f32) {
        let mut state = self.state.lock().unwrap();
        state.axes.0 += dx;
        state.axes.1 += dy;
    }

    pub fn scroll(&self, delta: f32) {
        self.state.lock().unwrap().wheel += delta;
    }

    pub fn set_button(&self, button: MouseButton, down: bool) {
        let mut state = self.state.lock().unwrap();
        match button {
            MouseButton::Left => state.left = down,
            MouseButton::Right => state.right = down,
            MouseButton::Middle => state.middle = down,
        }
    }
}

impl InputSource for FakeInputSource {
    fn key_down(&self, key: HostKey) -> bool {
        self.state.lock().unwrap().down.contains(&key)
    }

    fn any_key_down(&self) -> bool {
        !self.state.lock().unwrap().down.is_empty()
    }

    fn typed_chars(&self) -> SmallVec<[u8; 8]> {
        let mut state = self.state.lock().unwrap();
        let typed = state.typed.iter().copied().collect();
        state.typed.clear();
        typed
    }

    fn mouse_axes(&self) -> (f32, f32) {
        let mut state = self.state.lock().unwrap();
        let axes = state.axes;
        state.axes = (0.0, 0.0);
        axes
    }

    fn wheel_delta(&self) -> f32 {
        let mut state = self.state.lock().unwrap();
        let wheel = state.wheel;
        state.wheel = 0.0;
        wheel
    }

    fn button_down(&self, button: MouseButton) -> bool {
        let state = self.state.lock().unwrap();
        match button {
            MouseButton::Left => state.left,
            MouseButton::Right => state.right,
            MouseButton::Middle => state.middle,
        }
    }
}

// ── Recording client ─────────────────────────────────────────────

/// A [`Client`] that records every notification it receives.
#[derive(Default)]
pub struct RecordingClient {
    accepting: AtomicBool,
    pub inits: Mutex<Vec<(u32, u32)>>,
    pub ticks: AtomicUsize,
    pub titles: Mutex<Vec<String>>,
    pub exits: Mutex<Vec<i32>>,
    pub draws: AtomicUsize,
    /// Optional shared log for cross-client ordering assertions: each
    /// tick notification appends `tag`.
    pub tick_order: Mutex<Option<(usize, Arc<Mutex<Vec<usize>>>)>>,
}

impl RecordingClient {
    pub fn new(accepting: bool) -> Self {
        let client = Self::default();
        client.accepting.store(accepting, Ordering::SeqCst);
        client
    }

    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    pub fn track_tick_order(&self, tag: usize, log: Arc<Mutex<Vec<usize>>>) {
        *self.tick_order.lock().unwrap() = Some((tag, log));
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn draw_count(&self) -> usize {
        self.draws.load(Ordering::SeqCst)
    }

    pub fn exit_codes(&self) -> Vec<i32> {
        self.exits.lock().unwrap().clone()
    }
}

impl Client for RecordingClient {
    fn accepting_input(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    fn on_init(&self, width: u32, height: u32) {
        self.inits.lock().unwrap().push((width, height));
    }

    fn on_tick(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        if let Some((tag, log)) = self.tick_order.lock().unwrap().as_ref() {
            log.lock().unwrap().push(*tag);
        }
    }

    fn on_window_title(&self, title: &str) {
        self.titles.lock().unwrap().push(title.to_owned());
    }

    fn on_exit(&self, code: i32) {
        self.exits.lock().unwrap().push(code);
    }

    fn on_draw_frame(&self) {
        self.draws.fetch_add(1, Ordering::SeqCst);
    }
}
