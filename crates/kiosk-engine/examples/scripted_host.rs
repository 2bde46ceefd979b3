//! Minimal host loop against a scripted native engine.
//!
//! Run with: `cargo run -p kiosk-engine --example scripted_host`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kiosk_engine::{Engine, EngineConfig};
use kiosk_test_utils::{FakeInputSource, RecordingClient, ScriptedEngine};

struct PrintingViewer {
    frames: AtomicUsize,
}

impl kiosk_core::client::Client for PrintingViewer {
    fn accepting_input(&self) -> bool {
        true
    }

    fn on_init(&self, width: u32, height: u32) {
        println!("engine came up at {width}x{height}");
    }

    fn on_draw_frame(&self) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exit(&self, code: i32) {
        println!("engine exited with code {code}");
    }
}

fn main() {
    let script = ScriptedEngine::new(320, 200);
    let engine = Engine::new(EngineConfig::default(), Box::new(script)).expect("valid config");
    let source = FakeInputSource::new();

    let viewer = Arc::new(PrintingViewer {
        frames: AtomicUsize::new(0),
    });
    let id = engine.attach(Arc::clone(&viewer) as Arc<dyn kiosk_core::client::Client>);

    // A second, unfocused viewer sharing the same simulation.
    let recorder = Arc::new(RecordingClient::new(false));
    let recorder_id = engine.attach(Arc::clone(&recorder) as Arc<dyn kiosk_core::client::Client>);

    // Sixty host ticks at roughly 60 Hz.
    for _ in 0..60 {
        engine.pump(&source);
        thread::sleep(Duration::from_millis(16));
    }

    let status = engine.status();
    println!(
        "after one second: {} frames to the viewer, {} ticks to the recorder, state {:?}",
        viewer.frames.load(Ordering::SeqCst),
        recorder.tick_count(),
        status.frame_state,
    );

    engine.detach(recorder_id);
    engine.detach(id);
}
