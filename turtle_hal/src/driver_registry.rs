//! Driver registry for bit-bang port devices.
//!
//! Provides a `DriverRegistry` struct for registering and retrieving device
//! factories. This uses constructor-injection rather than global state.

use std::collections::HashMap;
use turtle_common::device::{DeviceFactory, PortDevice};
use turtle_common::error::PortError;

use crate::drivers::register_all_drivers;

/// Registry of available device drivers.
///
/// Constructed at startup, populated via `register()`, and passed to
/// `TurtleCore` by value. No global state, testable in isolation.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DeviceFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in driver.
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self::new();
        register_all_drivers(&mut registry);
        registry
    }

    /// Register a driver factory.
    ///
    /// # Panics
    /// Panics if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: DeviceFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a driver factory by name.
    pub fn get_factory(&self, name: &str) -> Option<DeviceFactory> {
        self.factories.get(name).copied()
    }

    /// Open the device with serial number `serial` through driver `name`.
    ///
    /// # Errors
    /// - `PortError::DriverNotFound` if no driver with the given name is registered
    /// - `PortError::DeviceUnavailable` if the driver cannot open the device
    pub fn open(
        &self,
        name: &str,
        serial: &str,
        input_pattern: &[u8],
    ) -> Result<Box<dyn PortDevice>, PortError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| PortError::DriverNotFound(name.to_string()))?;
        factory(serial, input_pattern)
    }

    /// List all registered driver names.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
