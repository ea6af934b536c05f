//! Port I/O model.
//!
//! - [`bits`] - `PortBits` flag set naming every pin of the 8-bit port
//! - [`channel`] - Output/input channel indices and `SensorSample`
//! - [`bridge`] - H-bridge pairs and commands
//! - [`register`] - `PortRegister`, the single owner of the port value

pub mod bits;
pub mod bridge;
pub mod channel;
pub mod register;
