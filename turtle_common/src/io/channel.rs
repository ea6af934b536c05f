//! Channel model: output/input channel indices and their bit masks.
//!
//! Channels carry no state of their own; `PortRegister` holds the value
//! and channels only name which bit of it an operation touches.

use core::fmt;

use crate::consts::OUTPUT_CHANNELS;
use crate::error::PortError;
use crate::io::bits::PortBits;

// ─── OutputChannel ──────────────────────────────────────────────────

/// A writable channel, index 0-5.
///
/// Construction is the only place an index is validated; once built, an
/// `OutputChannel` can never address an input bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputChannel(u8);

impl OutputChannel {
    /// Validate `index` as an output channel.
    ///
    /// # Errors
    /// `PortError::InvalidChannel` for any index above 5, including the
    /// read-only sensor channels 6 and 7.
    pub fn new(index: u8) -> Result<Self, PortError> {
        if index < OUTPUT_CHANNELS {
            Ok(Self(index))
        } else {
            Err(PortError::InvalidChannel(index))
        }
    }

    /// Caller guarantees `index < OUTPUT_CHANNELS`.
    pub(crate) const fn from_index(index: u8) -> Self {
        Self(index)
    }

    /// Channel index (0-5).
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Single-bit mask of this channel.
    #[inline]
    pub const fn mask(self) -> u8 {
        1 << self.0
    }

    /// Iterate over all six output channels in index order.
    pub fn all() -> impl Iterator<Item = OutputChannel> {
        (0..OUTPUT_CHANNELS).map(Self)
    }
}

impl TryFrom<u8> for OutputChannel {
    type Error = PortError;
    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl fmt::Display for OutputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OUT{}", self.0)
    }
}

// ─── InputChannel ───────────────────────────────────────────────────

/// A read-only sensor channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InputChannel {
    /// Channel 6, the primary (navigation) sensor.
    In6 = 6,
    /// Channel 7, the secondary sensor.
    In7 = 7,
}

impl InputChannel {
    /// Both input channels, primary first.
    pub const ALL: [InputChannel; 2] = [InputChannel::In6, InputChannel::In7];

    /// Channel index (6 or 7).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Single-bit mask of this channel.
    #[inline]
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for InputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IN{}", self.index())
    }
}

// ─── SensorSample ───────────────────────────────────────────────────

/// Both sensor readings taken from one live port read.
///
/// Recomputed on every poll; never cached between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSample {
    /// Channel 6 level (true = high).
    pub in6: bool,
    /// Channel 7 level (true = high).
    pub in7: bool,
}

impl SensorSample {
    /// Derive the sample from a full port value.
    pub fn from_port(value: u8) -> Self {
        let bits = PortBits::from_bits_retain(value);
        Self {
            in6: bits.contains(PortBits::IN6),
            in7: bits.contains(PortBits::IN7),
        }
    }

    /// Level of a single input channel.
    pub fn is_high(&self, channel: InputChannel) -> bool {
        match channel {
            InputChannel::In6 => self.in6,
            InputChannel::In7 => self.in7,
        }
    }

    /// True when the primary sensor reads low.
    #[inline]
    pub fn primary_low(&self) -> bool {
        !self.in6
    }
}
