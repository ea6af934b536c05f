//! The 8-bit port register.
//!
//! `PortRegister` owns the device handle and the last known port value.
//! It is the only path through which outputs change: every mutation is
//! written to the device before the call returns, so the hardware never
//! lags behind the cached value.
//!
//! Output bits are latched in software (bits 0-5); input bits (6-7) are
//! taken from the device on every read and never written.

use tracing::trace;

use crate::consts::DIRECTION_MASK;
use crate::device::PortDevice;
use crate::error::PortError;
use crate::io::channel::{OutputChannel, SensorSample};

/// Owned view of the bit-bang port.
pub struct PortRegister {
    /// Device collaborator
    device: Box<dyn PortDevice>,
    /// Output latch plus the input bits seen on the last device access
    value: u8,
    /// Direction mask, fixed at open
    direction: u8,
}

impl PortRegister {
    /// Latch the direction mask on `device` and take ownership of it.
    ///
    /// The output latch starts at zero; callers drive the port to a known
    /// state with `zero_all()` before use.
    ///
    /// # Errors
    /// `PortError::DeviceUnavailable` if the device rejects the direction
    /// write or the initial read.
    pub fn open(mut device: Box<dyn PortDevice>) -> Result<Self, PortError> {
        device.set_direction(DIRECTION_MASK)?;
        let raw = device.read_port()?;
        trace!("Port opened on {} ({}), raw=0x{:02X}", device.name(), device.serial(), raw);
        Ok(Self {
            device,
            value: raw & !DIRECTION_MASK,
            direction: DIRECTION_MASK,
        })
    }

    /// Direction mask latched at open.
    #[inline]
    pub fn direction(&self) -> u8 {
        self.direction
    }

    /// Last known port value without touching the device.
    #[inline]
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Name of the underlying driver.
    pub fn device_name(&self) -> &'static str {
        self.device.name()
    }

    /// Serial number of the underlying device.
    pub fn serial(&self) -> &str {
        self.device.serial()
    }

    /// Apply `value` restricted to `mask` onto the register.
    ///
    /// Bits outside `mask`, and all input bits, keep their value.
    pub fn write(&mut self, mask: u8, value: u8) -> Result<(), PortError> {
        let mask = mask & self.direction;
        let outputs = ((self.value & !mask) | (value & mask)) & self.direction;
        trace!("Port write 0x{:02X} (mask 0x{:02X})", outputs, mask);
        let readback = self.device.write_port(outputs)?;
        self.value = outputs | (readback & !self.direction);
        Ok(())
    }

    /// Read the full port value, inputs fresh from the device.
    pub fn read_all(&mut self) -> Result<u8, PortError> {
        let raw = self.device.read_port()?;
        self.value = (self.value & self.direction) | (raw & !self.direction);
        Ok(self.value)
    }

    /// Drive one output channel to `level`.
    pub fn drive(&mut self, channel: OutputChannel, level: bool) -> Result<(), PortError> {
        let mask = channel.mask();
        self.write(mask, if level { mask } else { 0 })
    }

    /// Set output channel `index` high.
    ///
    /// # Errors
    /// `PortError::InvalidChannel` for indices outside 0-5.
    pub fn set_channel(&mut self, index: u8) -> Result<(), PortError> {
        self.drive(OutputChannel::new(index)?, true)
    }

    /// Set output channel `index` low.
    ///
    /// # Errors
    /// `PortError::InvalidChannel` for indices outside 0-5.
    pub fn clear_channel(&mut self, index: u8) -> Result<(), PortError> {
        self.drive(OutputChannel::new(index)?, false)
    }

    /// Invert output channel `index`.
    ///
    /// Reads the port first; not atomic against other writers, which is
    /// fine because only the owning loop drives outputs.
    ///
    /// # Errors
    /// `PortError::InvalidChannel` for indices outside 0-5.
    pub fn toggle_channel(&mut self, index: u8) -> Result<(), PortError> {
        let channel = OutputChannel::new(index)?;
        let current = self.read_all()?;
        self.write(channel.mask(), !current)
    }

    /// Drive every output low.
    pub fn zero_all(&mut self) -> Result<(), PortError> {
        self.write(self.direction, 0x00)
    }

    /// Take a fresh sensor sample.
    pub fn sample(&mut self) -> Result<SensorSample, PortError> {
        Ok(SensorSample::from_port(self.read_all()?))
    }

    /// Release the device.
    pub fn close(&mut self) -> Result<(), PortError> {
        self.device.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Shared view of what the fake device has seen.
    #[derive(Debug, Default)]
    struct Wire {
        direction: Option<u8>,
        inputs: u8,
        writes: Vec<u8>,
        fail: bool,
    }

    struct FakeDevice {
        wire: Arc<Mutex<Wire>>,
        latch: u8,
    }

    impl PortDevice for FakeDevice {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn serial(&self) -> &str {
            "FAKE0001"
        }

        fn set_direction(&mut self, mask: u8) -> Result<(), PortError> {
            self.wire.lock().unwrap().direction = Some(mask);
            Ok(())
        }

        fn read_port(&mut self) -> Result<u8, PortError> {
            let wire = self.wire.lock().unwrap();
            if wire.fail {
                return Err(PortError::DeviceUnavailable("read failed".to_string()));
            }
            // Real adapters report garbage on output pins; the register must
            // not trust them.
            Ok(wire.inputs | 0x15)
        }

        fn write_port(&mut self, value: u8) -> Result<u8, PortError> {
            let mut wire = self.wire.lock().unwrap();
            if wire.fail {
                return Err(PortError::DeviceUnavailable("write failed".to_string()));
            }
            wire.writes.push(value);
            self.latch = value;
            Ok(self.latch | wire.inputs)
        }
    }

    fn open_register() -> (PortRegister, Arc<Mutex<Wire>>) {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let device = FakeDevice {
            wire: Arc::clone(&wire),
            latch: 0,
        };
        let mut reg = PortRegister::open(Box::new(device)).unwrap();
        reg.zero_all().unwrap();
        wire.lock().unwrap().writes.clear();
        (reg, wire)
    }

    #[test]
    fn open_latches_direction_mask() {
        let (reg, wire) = open_register();
        assert_eq!(wire.lock().unwrap().direction, Some(0x3F));
        assert_eq!(reg.direction(), 0x3F);
    }

    #[test]
    fn write_only_touches_masked_bits() {
        let (mut reg, _wire) = open_register();
        reg.write(0x3F, 0x2A).unwrap();
        reg.write(0x03, 0x01).unwrap();
        assert_eq!(reg.value() & 0x3F, 0x29);
    }

    #[test]
    fn write_never_drives_input_bits() {
        let (mut reg, wire) = open_register();
        reg.write(0xFF, 0xFF).unwrap();
        reg.set_channel(5).unwrap();
        reg.toggle_channel(0).unwrap();
        let writes = wire.lock().unwrap().writes.clone();
        assert!(!writes.is_empty());
        assert!(writes.iter().all(|w| w & 0xC0 == 0));
    }

    #[test]
    fn inputs_reported_through_read_all() {
        let (mut reg, wire) = open_register();
        reg.set_channel(2).unwrap();
        wire.lock().unwrap().inputs = 0x80;

        let value = reg.read_all().unwrap();
        assert_eq!(value, 0x84);
        let sample = reg.sample().unwrap();
        assert!(!sample.in6);
        assert!(sample.in7);
    }

    #[test]
    fn toggle_twice_restores_register() {
        let (mut reg, _wire) = open_register();
        reg.write(0x3F, 0x15).unwrap();
        for index in 0..6 {
            let before = reg.read_all().unwrap();
            reg.toggle_channel(index).unwrap();
            assert_ne!(reg.value(), before);
            reg.toggle_channel(index).unwrap();
            assert_eq!(reg.read_all().unwrap(), before);
        }
    }

    #[test]
    fn set_and_clear_single_channel() {
        let (mut reg, _wire) = open_register();
        reg.set_channel(3).unwrap();
        assert_eq!(reg.value() & 0x3F, 0x08);
        reg.set_channel(0).unwrap();
        reg.clear_channel(3).unwrap();
        assert_eq!(reg.value() & 0x3F, 0x01);
    }

    #[test]
    fn input_channels_are_rejected() {
        let (mut reg, wire) = open_register();
        for index in [6, 7, 8] {
            assert_eq!(reg.set_channel(index), Err(PortError::InvalidChannel(index)));
            assert_eq!(reg.clear_channel(index), Err(PortError::InvalidChannel(index)));
            assert_eq!(reg.toggle_channel(index), Err(PortError::InvalidChannel(index)));
        }
        assert!(wire.lock().unwrap().writes.is_empty());
    }

    #[test]
    fn zero_all_clears_outputs() {
        let (mut reg, wire) = open_register();
        reg.write(0x3F, 0x3F).unwrap();
        reg.zero_all().unwrap();
        assert_eq!(reg.value() & 0x3F, 0);
        assert_eq!(wire.lock().unwrap().writes.last(), Some(&0x00));
    }

    #[test]
    fn device_failure_propagates() {
        let (mut reg, wire) = open_register();
        wire.lock().unwrap().fail = true;
        assert!(matches!(
            reg.set_channel(1),
            Err(PortError::DeviceUnavailable(_))
        ));
        assert!(matches!(reg.sample(), Err(PortError::DeviceUnavailable(_))));
    }
}
