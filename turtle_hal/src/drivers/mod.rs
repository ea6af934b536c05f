//! Bit-bang device drivers.
//!
//! - [`simulation`] - Software port for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `PortDevice` trait from `turtle_common::device`
//! 3. Register its factory in `register_all_drivers()`

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::open_device);
}
