//! The dedicated simulation thread.
//!
//! Owns the only code allowed to invoke the native engine. The loop
//! body advances one frame-state step per iteration, gated by the
//! pause gate at the top; the cooperative stop flag (raised by the
//! native exit callback) ends the loop between steps, never mid-step.
//! The native engine is returned to the caller through the join
//! handle so a later `start_once` can respawn with it.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use kiosk_core::error::EXIT_LIBRARY_MISSING;

use crate::native::{NativeEngine, NativeHooks};
use crate::shared::Shared;
use crate::sync::SimStep;

/// Body of the simulation thread.
///
/// Returns the native engine so the facade can recover it for a
/// restart after a fatal exit.
pub(crate) fn run(shared: Arc<Shared>, mut native: Box<dyn NativeEngine>) -> Box<dyn NativeEngine> {
    shared.record_sim_thread();
    let hooks = Arc::new(NativeHooks::new(Arc::clone(&shared)));

    if let Err(err) = native.locate() {
        error!(error = %err, "native engine unavailable; reporting startup failure");
        hooks.on_exit(EXIT_LIBRARY_MISSING);
        return native;
    }

    shared.start_clock();
    let startup = Instant::now();
    if let Err(err) = native.start(Arc::clone(&hooks), &shared.config.args) {
        error!(error = %err, "native engine failed to start");
        hooks.on_exit(EXIT_LIBRARY_MISSING);
        return native;
    }
    if shared.stop.load(Ordering::Acquire) {
        // The engine reported exit from inside its own startup.
        debug!("native engine exited during startup");
        return native;
    }
    let startup_millis = startup.elapsed().as_millis() as u64;
    shared.startup_millis.store(startup_millis, Ordering::Release);
    shared.started.store(true, Ordering::Release);
    info!(startup_ms = startup_millis, "native engine started");

    loop {
        if shared.stop.load(Ordering::Acquire) {
            break;
        }
        shared.sync.wait_running();
        if shared.stop.load(Ordering::Acquire) {
            break;
        }
        match shared.sync.sim_step() {
            SimStep::RunTick => {
                native.tick();
                shared.sync.finish_tick();
            }
            SimStep::NotifyTick => {
                let notify = Arc::clone(&shared);
                shared.schedule(Box::new(move || notify.clients.on_tick()));
            }
            SimStep::Continue => {}
        }
    }

    debug!("simulation loop stopped");
    native
}
