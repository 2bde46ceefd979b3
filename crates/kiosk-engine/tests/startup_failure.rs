//! Startup-failure and fatal-exit paths: the engine degrades into an
//! exit notification instead of throwing across the thread boundary.

mod common;

use std::sync::Arc;

use common::pump_until;
use kiosk_core::error::EXIT_LIBRARY_MISSING;
use kiosk_engine::{Engine, EngineConfig, FrameState};
use kiosk_test_utils::{FakeInputSource, RecordingClient, ScriptedEngine};

#[test]
fn missing_library_reports_sentinel_exit() {
    let script = ScriptedEngine::new(320, 200).missing();
    let engine = Engine::new(EngineConfig::default(), Box::new(script)).unwrap();
    let source = FakeInputSource::new();

    let client = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    pump_until(&engine, &source, "startup-failure exit", || {
        !client.exit_codes().is_empty()
    });

    assert_eq!(client.exit_codes(), vec![EXIT_LIBRARY_MISSING]);
    let status = engine.status();
    assert!(status.initialized, "the worker did start once");
    assert!(!status.started, "the native engine never came up");
    assert_eq!(status.last_exit_code, EXIT_LIBRARY_MISSING);
    assert_eq!(
        status.frame_state,
        FrameState::FrameStart,
        "no frame-state progress may ever occur"
    );
    assert_eq!(status.clients, 0, "clients are cleared on a fatal exit");
    assert!(!engine.native_available());
}

#[test]
fn fatal_exit_notifies_and_clears_clients() {
    let script = ScriptedEngine::new(8, 8).exit_at(3, 2);
    let probes = script.probes();
    let engine = Engine::new(EngineConfig::default(), Box::new(script)).unwrap();
    let source = FakeInputSource::new();

    let a = Arc::new(RecordingClient::new(false));
    let b = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&a) as Arc<dyn kiosk_core::client::Client>);
    engine.attach(Arc::clone(&b) as Arc<dyn kiosk_core::client::Client>);

    pump_until(&engine, &source, "fatal exit notification", || {
        !a.exit_codes().is_empty() && !b.exit_codes().is_empty()
    });

    assert_eq!(a.exit_codes(), vec![2]);
    assert_eq!(b.exit_codes(), vec![2]);
    assert!(probes.ticks.load(std::sync::atomic::Ordering::SeqCst) >= 3);
    let status = engine.status();
    assert!(!status.started);
    assert_eq!(status.last_exit_code, 2);
    assert_eq!(status.clients, 0);
}

#[test]
fn clean_exit_notifies_without_clearing() {
    let script = ScriptedEngine::new(8, 8).exit_at(2, 0);
    let engine = Engine::new(EngineConfig::default(), Box::new(script)).unwrap();
    let source = FakeInputSource::new();

    let client = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);

    pump_until(&engine, &source, "clean exit notification", || {
        !client.exit_codes().is_empty()
    });

    assert_eq!(client.exit_codes(), vec![0]);
    let status = engine.status();
    assert!(!status.started);
    assert_eq!(status.clients, 1, "a clean exit keeps registrations");
}

#[test]
fn start_once_restarts_after_fatal_exit() {
    let script = ScriptedEngine::new(8, 8).exit_at(3, 2);
    let engine = Engine::new(EngineConfig::default(), Box::new(script)).unwrap();
    let source = FakeInputSource::new();

    let first = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&first) as Arc<dyn kiosk_core::client::Client>);
    pump_until(&engine, &source, "first fatal exit", || {
        !first.exit_codes().is_empty()
    });
    assert!(!engine.status().started);

    // The engine was cleared; a new viewer attaches and explicitly
    // restarts. The scripted engine still insists on exiting, which is
    // exactly what lets us observe the restarted worker run.
    let second = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&second) as Arc<dyn kiosk_core::client::Client>);
    engine.start_once();

    pump_until(&engine, &source, "exit from the restarted worker", || {
        !second.exit_codes().is_empty()
    });
    assert_eq!(second.exit_codes(), vec![2]);
    assert!(
        !second.inits.lock().unwrap().is_empty(),
        "the restarted worker ran native startup again"
    );
}

#[test]
fn start_once_is_a_no_op_while_running() {
    let script = ScriptedEngine::new(8, 8);
    let engine = Engine::new(EngineConfig::default(), Box::new(script)).unwrap();
    let source = FakeInputSource::new();

    let client = Arc::new(RecordingClient::new(false));
    engine.attach(Arc::clone(&client) as Arc<dyn kiosk_core::client::Client>);
    pump_until(&engine, &source, "engine running", || {
        client.tick_count() >= 1
    });

    engine.start_once();
    engine.start_once();

    pump_until(&engine, &source, "still exactly one init", || {
        client.tick_count() >= 3
    });
    assert_eq!(client.inits.lock().unwrap().len(), 1);
}
