//! Frame-synchronized host for a callback-driven native game engine.
//!
//! Runs an opaque, non-preemptible native engine on a dedicated
//! simulation thread, frame-for-frame synchronized with a
//! single-threaded cooperative host loop, and fans the results out to
//! any number of attachable viewer clients.
//!
//! # Architecture
//!
//! ```text
//! Host thread                    Simulation thread
//!     |                               |
//!     |-- pump() ------------------   |  wait_running()     (pause gate)
//!     |   drain host queue        |   |  FrameStart -> GatherInput
//!     |   sample input (if focus) |   |  block on input gate
//!     |   grant_input() ----------+-->|  DoGameTick: native tick
//!     |                               |    draw callback -> WaitForDraw
//!     |-- take_draw(), copy frame,    |  block on draw gate
//!     |   notify, ack_draw() -------->|  FrameEnd: tick notification
//!     |                               |  -> FrameStart
//! ```
//!
//! Exactly two long-lived threads, no timeouts on any gate, at most
//! one frame ever in flight.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clients;
pub mod config;
pub mod engine;
pub mod gate;
pub mod host_queue;
pub mod input;
pub mod native;
pub mod screen;
pub mod sync;

mod shared;
mod worker;

pub use clients::ClientMux;
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, EngineStatus};
pub use gate::Gate;
pub use host_queue::{HostAction, HostQueue};
pub use input::{InputAggregator, InputSource};
pub use native::{FrameSource, NativeEngine, NativeHooks};
pub use screen::{Screen, BYTES_PER_PIXEL};
pub use sync::{FrameState, FrameSync, SimStep};
