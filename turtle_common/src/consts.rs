//! System-wide constants for the turtle workspace.
//!
//! Single source of truth for register layout and timing defaults.

use static_assertions::const_assert;

/// Direction mask written once at startup: bits 0-5 output, bits 6-7 input.
pub const DIRECTION_MASK: u8 = 0x3F;

/// Number of writable output channels (indices 0..OUTPUT_CHANNELS).
pub const OUTPUT_CHANNELS: u8 = 6;

/// Default serial number of the FT232R breakout the turtle is wired to.
pub const DEFAULT_SERIAL: &str = "A105BPBO";

/// Default device driver name.
pub const DEFAULT_DRIVER: &str = "simulation";

/// Default service name used in logs.
pub const DEFAULT_SERVICE_NAME: &str = "turtle";

/// Default maneuver pulse hold in microseconds (5 ms).
pub const DEFAULT_COMMAND_DELAY_US: u64 = 5_000;

/// Longest accepted maneuver pulse hold in microseconds.
///
/// Past this the motor windings carry current long enough to overheat.
pub const MAX_COMMAND_DELAY_US: u64 = 20_000;

/// Default inter-cycle delay of the navigation and console loops.
pub const DEFAULT_LOOP_DELAY_MS: u64 = 100;

/// Number of `pivot_right` maneuvers in a navigation correction burst.
pub const CORRECTION_BURST: usize = 6;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/turtle/turtle.toml";

const_assert!(OUTPUT_CHANNELS <= 8);
const_assert!(DEFAULT_COMMAND_DELAY_US <= MAX_COMMAND_DELAY_US);
const_assert!(DIRECTION_MASK == (1u8 << OUTPUT_CHANNELS) - 1);
