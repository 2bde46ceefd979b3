//! Error types for the Kiosk engine host.
//!
//! Failures never unwind across the host/simulation thread boundary:
//! the worker reports fatal conditions through the exit notification,
//! and host-side operations return these error values directly.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Exit code reported when the native shared library cannot be located.
///
/// The engine marks itself started-then-immediately-exited with this
/// sentinel; no frame-state progress ever occurs.
pub const EXIT_LIBRARY_MISSING: i32 = 1;

/// Errors from locating or starting the native engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartError {
    /// The native shared library is not present at the configured path.
    MissingLibrary {
        /// The path that was probed.
        path: PathBuf,
    },
    /// The native engine is present but refused to start.
    Unavailable {
        /// Human-readable description from the native layer.
        reason: String,
    },
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLibrary { path } => {
                write!(f, "native library not found at {}", path.display())
            }
            Self::Unavailable { reason } => {
                write!(f, "native engine unavailable: {reason}")
            }
        }
    }
}

impl Error for StartError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let err = StartError::MissingLibrary {
            path: PathBuf::from("/opt/retrocore.so"),
        };
        assert!(err.to_string().contains("/opt/retrocore.so"));
    }
}
