//! Turtle Common Library
//!
//! Shared types for every crate that drives the bit-bang port: the 8-bit
//! register model, the channel and H-bridge vocabulary, the device
//! collaborator trait, error types and configuration loading.
//!
//! # Module Structure
//!
//! - [`consts`] - Direction mask, timing defaults and other fixed values
//! - [`io`] - Port bits, channels, bridge pairs/commands and the `PortRegister`
//! - [`device`] - `PortDevice` trait implemented by hardware/simulation drivers
//! - [`error`] - `PortError` taxonomy
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use turtle_common::prelude::*;
//!
//! let pair: BridgePair = "B".parse().unwrap();
//! let (first, second) = pair.channels();
//! assert_eq!((first.index(), second.index()), (2, 3));
//! ```

pub mod config;
pub mod consts;
pub mod device;
pub mod error;
pub mod io;
pub mod prelude;
