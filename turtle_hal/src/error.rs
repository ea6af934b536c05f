//! Error type for the control loops and their lifecycle.

use thiserror::Error;
use turtle_common::config::ConfigError;
use turtle_common::error::PortError;

/// Error types for `TurtleCore` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Port, bridge or device failure
    #[error(transparent)]
    Port(#[from] PortError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Keyboard or status output failure
    #[error("Terminal I/O error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Loop started before `init()`
    #[error("Device not initialized")]
    NotInitialized,
}
