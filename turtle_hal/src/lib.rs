//! # Turtle HAL Library
//!
//! H-bridge drive and control loops for a two-track robot wired to a USB
//! bit-bang adapter. Devices implement the `PortDevice` trait defined in
//! `turtle_common::device`.
//!
//! # Module Structure
//!
//! - [`bridge`] - Bridge driver (pair + command -> two channel writes)
//! - [`maneuver`] - Pulse-and-coast maneuvers for both tracks
//! - [`navigation`] - Reflex navigation policy and step function
//! - [`console`] - Manual console key table and step function
//! - [`keyboard`] - Raw-mode keyboard guard
//! - [`clock`] - Sleep seam shared by maneuvers and loops
//! - [`core`] - `TurtleCore`, device lifecycle and loop drivers
//! - [`driver_registry`] - Device factory registration
//! - [`drivers`] - Device driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       turtle_hal                                 │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────────┐  │
//! │  │  KeySource  │───►│  TurtleCore  │◄──►│  Driver Registry    │  │
//! │  │  / Clock    │    │ (loop driver)│    │                     │  │
//! │  └─────────────┘    └──────┬───────┘    └─────────────────────┘  │
//! │                            │ tick()                              │
//! │              ┌─────────────┴─────────────┐                       │
//! │              ▼                           ▼                       │
//! │      ┌──────────────┐            ┌──────────────┐                │
//! │      │  Navigator   │            │   Console    │                │
//! │      └──────┬───────┘            └──────┬───────┘                │
//! │             ▼                           │                        │
//! │      ┌──────────────┐                   │                        │
//! │      │  Sequencer   │                   │                        │
//! │      └──────┬───────┘                   │                        │
//! │             ▼                           ▼                        │
//! │      ┌──────────────────────────────────────────┐                │
//! │      │  apply_bridge -> PortRegister -> device  │                │
//! │      └──────────────────────────────────────────┘                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod bridge;
pub mod clock;
pub mod console;
pub mod core;
pub mod driver_registry;
pub mod drivers;
pub mod error;
pub mod keyboard;
pub mod maneuver;
pub mod navigation;

#[cfg(test)]
mod testing;

// Re-export key types for convenience
pub use crate::core::{LoopStats, TurtleCore};
pub use crate::driver_registry::DriverRegistry;
pub use crate::error::CoreError;
