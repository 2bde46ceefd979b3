//! Core types and traits for the Kiosk engine host.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the key-code vocabulary shared by the host sampler and the native
//! engine, the mouse report types, the viewer client capability trait,
//! and the error taxonomy used across the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod client;
pub mod error;
pub mod key;
pub mod mouse;

pub use client::{Client, ClientId};
pub use error::{StartError, EXIT_LIBRARY_MISSING};
pub use key::{HostKey, KeyCode, KeyEdge};
pub use mouse::{MouseButton, MouseButtons, MouseReport};
