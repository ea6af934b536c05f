//! Bit-bang device trait.
//!
//! This module defines:
//! - `PortDevice` trait - Interface for the USB bit-bang adapter (or a stand-in)
//! - `DeviceFactory` type alias - Factory function type used by the driver registry
//!
//! The device is a collaborator: the core only ever asks it to latch a
//! direction mask, write the 8-bit port and read the port back. Transport,
//! enumeration and serial-number matching live behind the factory.

use crate::error::PortError;

/// Factory function type for opening a device by serial number.
///
/// Receives the configured serial number and the replayed input pattern
/// (only meaningful for simulated devices). Returns
/// `PortError::DeviceUnavailable` when no matching device can be opened.
pub type DeviceFactory = fn(serial: &str, input_pattern: &[u8]) -> Result<Box<dyn PortDevice>, PortError>;

/// Trait defining the interface for bit-bang port devices.
///
/// # Lifecycle
///
/// 1. Factory opens the device (serial-number match)
/// 2. `set_direction()` - Called once with `0x3F` before any port access
/// 3. `write_port()` / `read_port()` - Called by `PortRegister` on every access
/// 4. `close()` - Called once when the owning loop shuts down
///
/// Every method that talks to hardware reports failure as
/// `PortError::DeviceUnavailable`; callers never retry.
pub trait PortDevice: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Serial number of the opened device.
    fn serial(&self) -> &str;

    /// Latch the pin direction mask (1 = output, 0 = input).
    fn set_direction(&mut self, mask: u8) -> Result<(), PortError>;

    /// Read the full 8-bit port, including externally driven input bits.
    fn read_port(&mut self) -> Result<u8, PortError>;

    /// Write the port and return the value read back afterwards.
    fn write_port(&mut self, value: u8) -> Result<u8, PortError>;

    /// Release the device.
    /// Default: no-op
    fn close(&mut self) -> Result<(), PortError> {
        Ok(())
    }
}
