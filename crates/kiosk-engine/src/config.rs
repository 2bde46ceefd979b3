//! Engine configuration and validation.

use std::error::Error;
use std::fmt;

/// Configuration for [`Engine`](crate::Engine).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Arguments handed to the native engine's start entry point.
    pub args: Vec<String>,
    /// Accumulate vertical mouse deltas. Off by default: on an
    /// in-world screen, vertical look maps to forward/back movement.
    pub capture_mouse_y: bool,
    /// Keep the simulation running when the last client detaches,
    /// instead of auto-pausing.
    pub persist_without_clients: bool,
    /// Name given to the simulation thread.
    pub thread_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            capture_mouse_y: false,
            persist_without_clients: false,
            thread_name: "kiosk-sim".into(),
        }
    }
}

impl EngineConfig {
    /// Check structural invariants at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_name.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        if let Some(index) = self.args.iter().position(|arg| arg.contains('\0')) {
            return Err(ConfigError::NulInArg { index });
        }
        Ok(())
    }
}

/// Errors detected during [`EngineConfig::validate()`].
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The simulation thread name is empty.
    EmptyThreadName,
    /// A launch argument contains an interior nul byte and could never
    /// cross the C boundary.
    NulInArg {
        /// Index of the offending argument.
        index: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyThreadName => write!(f, "thread_name must not be empty"),
            Self::NulInArg { index } => {
                write!(f, "launch argument {index} contains a nul byte")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn empty_thread_name_is_rejected() {
        let config = EngineConfig {
            thread_name: String::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyThreadName));
    }

    #[test]
    fn nul_in_arg_is_rejected() {
        let config = EngineConfig {
            args: vec!["ok".into(), "bad\0arg".into()],
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NulInArg { index: 1 }));
    }
}
