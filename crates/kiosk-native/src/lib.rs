//! C ABI boundary between the Kiosk host and the native engine.
//!
//! The native engine is an opaque shared library driven entirely by
//! callbacks: the host hands it a fixed calling-convention table once
//! at startup, then ticks it. This is the only crate in the workspace
//! that may contain `unsafe` code, and every unsafe block is confined
//! to translating between the C table and the safe dispatcher in
//! `kiosk-engine`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod audio;
pub mod table;

#[cfg(feature = "linked")]
pub mod linked;

pub use audio::{MusicCallbacks, SfxCallbacks};
pub use table::{NativeCallbacks, RawFrameSource};

#[cfg(feature = "linked")]
pub use linked::LinkedEngine;
