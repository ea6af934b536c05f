//! Prelude module for common re-exports.
//!
//! # Usage
//!
//! ```rust
//! use turtle_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, DeviceConfig, LogLevel, SharedConfig, SimulationConfig,
    TimingConfig, TurtleConfig,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CORRECTION_BURST, DIRECTION_MASK, OUTPUT_CHANNELS};

// ─── Device & Errors ────────────────────────────────────────────────
pub use crate::device::{DeviceFactory, PortDevice};
pub use crate::error::PortError;

// ─── Port I/O ───────────────────────────────────────────────────────
pub use crate::io::bits::PortBits;
pub use crate::io::bridge::{BridgeCommand, BridgePair};
pub use crate::io::channel::{InputChannel, OutputChannel, SensorSample};
pub use crate::io::register::PortRegister;
