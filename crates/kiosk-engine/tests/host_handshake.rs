//! End-to-end handshake tests: a scripted native engine on the real
//! simulation thread, driven by the host pump.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use common::{pump_n, pump_until};
use kiosk_core::key::{HostKey, KeyCode};
use kiosk_core::mouse::MouseButton;
use kiosk_engine::{Engine, EngineConfig};
use kiosk_test_utils::{FakeInputSource, RecordingClient, ScriptProbes, ScriptedEngine};

fn engine_with(script: ScriptedEngine) -> Engine {
    Engine::new(EngineConfig::default(), Box::new(script)).expect("config is valid")
}

/// Pump until the scripted tick counter stops moving, then return it.
///
/// Used after a pause: the in-flight loop iteration is allowed to
/// finish one state step, so the counter settles rather than freezing
/// on the exact toggle instant.
fn settle_ticks(engine: &Engine, source: &FakeInputSource, probes: &ScriptProbes) -> usize {
    let mut last = probes.ticks.load(Ordering::SeqCst);
    let mut stable = 0;
    pump_until(engine, source, "tick counter to settle", || {
        let now = probes.ticks.load(Ordering::SeqCst);
        if now == last {
            stable += 1;
        } else {
            last = now;
            stable = 0;
        }
        stable >= 20
    });
    last
}

#[test]
fn init_broadcast_carries_resolution() {
    let script = ScriptedEngine::new(320, 200);
    let engine = engine_with(script);
    let source = FakeInputSource::new();

    let client = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    pump_until(&engine, &source, "init notification", || {
        !client.inits.lock().unwrap().is_empty()
    });
    assert_eq!(client.inits.lock().unwrap().as_slice(), &[(320, 200)]);
    assert_eq!(engine.status().resolution, (320, 200));
    assert!(engine.status().started);
}

#[test]
fn drawing_tick_copies_frame_and_notifies() {
    let script = ScriptedEngine::new(4, 2);
    let probes = script.probes();
    // A recognizable frame pattern behind the native buffer.
    let pattern: Vec<u8> = (0..32).collect();
    *probes.frame.lock().unwrap() = pattern.clone();

    let engine = engine_with(script);
    let source = FakeInputSource::new();
    let client = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    pump_until(&engine, &source, "first frame", || client.draw_count() >= 1);

    {
        let screen = engine.screen();
        assert_eq!(screen.width(), 4);
        assert_eq!(screen.height(), 2);
        assert_eq!(screen.pixels(), pattern.as_slice());
    }

    // Ticks keep flowing after the first frame.
    pump_until(&engine, &source, "third tick", || client.tick_count() >= 3);
}

#[test]
fn draw_free_ticks_complete_the_cycle() {
    let script = ScriptedEngine::new(8, 8).without_draws();
    let probes = script.probes();
    let engine = engine_with(script);
    let source = FakeInputSource::new();
    let client = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    pump_until(&engine, &source, "three draw-free ticks", || {
        client.tick_count() >= 3
    });
    assert_eq!(client.draw_count(), 0, "no draw callback, no draw notification");
    assert!(
        probes.mouse_seen.lock().unwrap().len() >= 3,
        "every tick polls the mouse even without draws"
    );
}

#[test]
fn focused_client_routes_input_and_all_clients_tick() {
    let script = ScriptedEngine::new(16, 16);
    let probes = script.probes();
    let engine = engine_with(script);
    let source = FakeInputSource::new();

    let focused = Arc::new(RecordingClient::new(true));
    let bystander = Arc::new(RecordingClient::new(false));
    let order = Arc::new(Mutex::new(Vec::new()));
    focused.track_tick_order(0, Arc::clone(&order));
    bystander.track_tick_order(1, Arc::clone(&order));

    engine.attach(Arc::clone(&focused) as Arc<dyn kiosk_core::client::Client>);
    engine.attach(Arc::clone(&bystander) as Arc<dyn kiosk_core::client::Client>);

    source.press(HostKey::Up);
    source.move_mouse(6.0, 0.0);
    source.set_button(MouseButton::Left, true);

    pump_until(&engine, &source, "both clients ticked", || {
        focused.tick_count() >= 1 && bystander.tick_count() >= 1
    });

    // Input was sampled because the focused client wanted it.
    pump_until(&engine, &source, "key edge reached the engine", || {
        probes
            .keys_seen
            .lock()
            .unwrap()
            .iter()
            .any(|edge| edge.code == KeyCode::UP && edge.pressed)
    });
    pump_until(&engine, &source, "mouse reached the engine", || {
        probes
            .mouse_seen
            .lock()
            .unwrap()
            .iter()
            .any(|report| report.delta_x > 0 && report.buttons.left)
    });

    // Notifications arrive in attachment order, tick after tick.
    let order = order.lock().unwrap();
    assert!(order.len() >= 2);
    for pair in order.chunks_exact(2) {
        assert_eq!(pair, &[0, 1]);
    }
}

#[test]
fn unfocused_engine_skips_sampling() {
    let script = ScriptedEngine::new(8, 8);
    let probes = script.probes();
    let engine = engine_with(script);
    let source = FakeInputSource::new();
    let client = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    source.press(HostKey::Up);
    pump_until(&engine, &source, "a few ticks", || client.tick_count() >= 3);

    assert!(
        probes.keys_seen.lock().unwrap().is_empty(),
        "input must not be sampled when no client accepts it"
    );
}

#[test]
fn ignored_left_click_stays_suppressed_until_release() {
    let script = ScriptedEngine::new(8, 8);
    let probes = script.probes();
    let engine = engine_with(script);
    let source = FakeInputSource::new();
    let client = Arc::new(RecordingClient::new(true));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    // The click that grants focus must not fire into the game.
    engine.ignore_next_left_click();
    source.set_button(MouseButton::Left, true);

    pump_until(&engine, &source, "mouse reports while suppressed", || {
        probes.mouse_seen.lock().unwrap().len() >= 3
    });
    assert!(
        probes
            .mouse_seen
            .lock()
            .unwrap()
            .iter()
            .all(|report| !report.buttons.left),
        "suppressed click must read released"
    );

    // Release, press again: the new click is genuine.
    source.set_button(MouseButton::Left, false);
    pump_n(&engine, &source, 5);
    source.set_button(MouseButton::Left, true);
    pump_until(&engine, &source, "genuine click reported", || {
        probes
            .mouse_seen
            .lock()
            .unwrap()
            .iter()
            .any(|report| report.buttons.left)
    });
}

#[test]
fn deferred_actions_run_on_the_next_pump() {
    let script = ScriptedEngine::new(8, 8);
    let engine = engine_with(script);
    let source = FakeInputSource::new();
    let client = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    // Scheduled from a foreign thread, executed by the host pump.
    std::thread::scope(|scope| {
        scope.spawn(|| {
            engine.schedule_on_host(Box::new(move || flag.store(true, Ordering::SeqCst)));
        });
    });
    assert!(!ran.load(Ordering::SeqCst), "deferred work must wait for the pump");
    engine.pump(&source);
    assert!(ran.load(Ordering::SeqCst));

    // run_on_host executes immediately when already on the host thread.
    let immediate = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&immediate);
    engine.run_on_host(Box::new(move || flag.store(true, Ordering::SeqCst)));
    assert!(immediate.load(Ordering::SeqCst));
}

#[test]
fn pause_freezes_ticks_and_resume_continues() {
    let script = ScriptedEngine::new(8, 8);
    let probes = script.probes();
    let engine = engine_with(script);
    let source = FakeInputSource::new();
    let client = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    pump_until(&engine, &source, "engine warmed up", || {
        client.tick_count() >= 2
    });

    engine.set_paused(true);
    assert!(!engine.status().running);
    let frozen = settle_ticks(&engine, &source, &probes);
    let frozen_state = engine.status().frame_state;

    pump_n(&engine, &source, 20);
    assert_eq!(
        probes.ticks.load(Ordering::SeqCst),
        frozen,
        "paused engine must not tick"
    );
    assert_eq!(engine.status().frame_state, frozen_state);

    engine.set_paused(false);
    pump_until(&engine, &source, "resume continues ticking", || {
        probes.ticks.load(Ordering::SeqCst) > frozen
    });
}

#[test]
fn title_change_reaches_clients_and_status() {
    let script = ScriptedEngine::new(8, 8).title_at(2, "RETRO DEMO");
    let engine = engine_with(script);
    let source = FakeInputSource::new();
    let client = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    pump_until(&engine, &source, "title notification", || {
        !client.titles.lock().unwrap().is_empty()
    });
    assert_eq!(client.titles.lock().unwrap().as_slice(), &["RETRO DEMO"]);
    assert_eq!(engine.window_title().as_deref(), Some("RETRO DEMO"));
}

#[test]
fn detaching_last_client_pauses_the_engine() {
    let script = ScriptedEngine::new(8, 8);
    let probes = script.probes();
    let engine = engine_with(script);
    let source = FakeInputSource::new();
    let client = Arc::new(RecordingClient::new(false));
    let id = engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    pump_until(&engine, &source, "engine warmed up", || {
        client.tick_count() >= 1
    });

    assert!(engine.detach(id));
    assert!(!engine.status().running);

    let frozen = settle_ticks(&engine, &source, &probes);
    pump_n(&engine, &source, 10);
    assert_eq!(probes.ticks.load(Ordering::SeqCst), frozen);

    // A new viewer resumes the show.
    let returning = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&returning) as Arc<dyn kiosk_core::client::Client>);
    assert!(engine.status().running);
    pump_until(&engine, &source, "ticks resume for new client", || {
        returning.tick_count() >= 1
    });
}
