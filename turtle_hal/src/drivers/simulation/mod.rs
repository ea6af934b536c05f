//! Simulation driver module.
//!
//! A software bit-bang port for running both control loops without the
//! USB adapter attached.

mod port;

pub use port::{PortProbe, SimulatedPort, HISTORY_CAPACITY};

use turtle_common::device::PortDevice;
use turtle_common::error::PortError;

/// Factory function to open a simulated port.
///
/// # Errors
/// `PortError::DeviceUnavailable` for an empty serial number, mirroring a
/// failed serial-number match on real hardware.
pub fn open_device(serial: &str, input_pattern: &[u8]) -> Result<Box<dyn PortDevice>, PortError> {
    if serial.trim().is_empty() {
        return Err(PortError::DeviceUnavailable(
            "no device serial number given".to_string(),
        ));
    }
    Ok(Box::new(SimulatedPort::new(serial, input_pattern)))
}
