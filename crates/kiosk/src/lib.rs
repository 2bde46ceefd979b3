//! Kiosk: host a callback-driven native game engine on in-world screens.
//!
//! This is the top-level facade crate re-exporting the public API from
//! the Kiosk sub-crates. For most users, adding `kiosk` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use kiosk::prelude::*;
//!
//! // A viewer that mirrors the screen somewhere and owns input focus.
//! struct Viewer;
//! impl Client for Viewer {
//!     fn accepting_input(&self) -> bool { true }
//!     fn on_init(&self, width: u32, height: u32) {
//!         println!("engine is {width}x{height}");
//!     }
//!     fn on_draw_frame(&self) { /* read engine.screen() */ }
//! }
//!
//! # struct Absent;
//! # impl NativeEngine for Absent {
//! #     fn locate(&self) -> Result<(), StartError> {
//! #         Err(StartError::MissingLibrary { path: "retrocore.so".into() })
//! #     }
//! #     fn start(
//! #         &mut self,
//! #         _hooks: Arc<NativeHooks>,
//! #         _args: &[String],
//! #     ) -> Result<(), StartError> { unreachable!() }
//! #     fn tick(&mut self) { unreachable!() }
//! # }
//! # let native = Box::new(Absent);
//! let engine = Engine::new(EngineConfig::default(), native).unwrap();
//! let id = engine.attach(Arc::new(Viewer));
//! // ... host loop: engine.pump(&input_source) once per tick ...
//! engine.detach(id);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `kiosk-core` | Key codes, mouse reports, the client trait, errors |
//! | [`engine`] | `kiosk-engine` | The facade, synchronizer, aggregator, queue, multiplexer |
//! | [`native`] | `kiosk-native` | The C callback table and link-time binding |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Key codes, mouse reports, the client trait, and error types.
pub mod types {
    pub use kiosk_core::client::{Client, ClientId};
    pub use kiosk_core::error::{StartError, EXIT_LIBRARY_MISSING};
    pub use kiosk_core::key::{HostKey, KeyCode, KeyEdge, DOUBLED_KEYS};
    pub use kiosk_core::mouse::{MouseButton, MouseButtons, MouseReport};
}

/// The engine facade and its building blocks.
pub mod engine {
    pub use kiosk_engine::{
        ClientMux, ConfigError, Engine, EngineConfig, EngineStatus, FrameState, FrameSource,
        FrameSync, Gate, HostAction, HostQueue, InputAggregator, InputSource, NativeEngine,
        NativeHooks, Screen, SimStep, BYTES_PER_PIXEL,
    };
}

/// The C ABI boundary to the real native engine.
pub mod native {
    pub use kiosk_native::{MusicCallbacks, NativeCallbacks, RawFrameSource, SfxCallbacks};

    #[cfg(feature = "linked")]
    pub use kiosk_native::LinkedEngine;
}

/// The common imports: `use kiosk::prelude::*;`.
pub mod prelude {
    pub use crate::engine::{
        Engine, EngineConfig, EngineStatus, FrameState, InputSource, NativeEngine, NativeHooks,
    };
    pub use crate::types::{
        Client, ClientId, HostKey, KeyCode, KeyEdge, MouseButton, MouseReport, StartError,
    };
}
