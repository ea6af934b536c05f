//! Error types for port, channel, bridge and device operations.

use thiserror::Error;

/// Error types for operations on the bit-bang port.
///
/// None of these are recoverable inline: the owning loop stops, drives all
/// outputs low and propagates the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// Write requested on a channel outside 0-5
    #[error("Invalid channel {0}: only channels 0-5 are writable")]
    InvalidChannel(u8),

    /// Unrecognized bridge pair or command token
    #[error("Invalid bridge arguments: {0}")]
    InvalidBridgeArgs(String),

    /// Device failed to open or communicate
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// No device driver registered under the requested name
    #[error("Driver not found: {0}")]
    DriverNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_display() {
        let err = PortError::InvalidChannel(6);
        assert!(err.to_string().contains('6'));

        let err = PortError::DeviceUnavailable("usb write failed".to_string());
        assert!(err.to_string().contains("usb write failed"));

        let err = PortError::InvalidBridgeArgs("pair 'D'".to_string());
        assert!(err.to_string().contains("pair 'D'"));
    }
}
