//! H-bridge vocabulary.
//!
//! A bridge pair is two adjacent output channels feeding one H-bridge
//! driver. The four commands are the only reachable states of a pair:
//!
//! | Command | first | second |
//! |---------|-------|--------|
//! | Left    | 1     | 0      |
//! | Right   | 0     | 1      |
//! | Brake   | 1     | 1      |
//! | Coast   | 0     | 0      |

use core::fmt;
use core::str::FromStr;

use crate::error::PortError;
use crate::io::channel::OutputChannel;

// ─── BridgePair ─────────────────────────────────────────────────────

/// One of the three H-bridge channel pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgePair {
    /// Channels 0 and 1 (left track).
    A,
    /// Channels 2 and 3 (right track).
    B,
    /// Channels 4 and 5 (auxiliary).
    C,
}

impl BridgePair {
    /// All pairs in channel order.
    pub const ALL: [BridgePair; 3] = [BridgePair::A, BridgePair::B, BridgePair::C];

    /// The pair's (first, second) output channels.
    pub const fn channels(self) -> (OutputChannel, OutputChannel) {
        let base = match self {
            Self::A => 0,
            Self::B => 2,
            Self::C => 4,
        };
        (
            OutputChannel::from_index(base),
            OutputChannel::from_index(base + 1),
        )
    }

    /// Combined mask of both channels.
    pub const fn mask(self) -> u8 {
        let (first, second) = self.channels();
        first.mask() | second.mask()
    }
}

impl fmt::Display for BridgePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
        }
    }
}

impl TryFrom<char> for BridgePair {
    type Error = PortError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            'C' => Ok(Self::C),
            _ => Err(PortError::InvalidBridgeArgs(format!(
                "unknown bridge pair {c:?}, expected A, B or C"
            ))),
        }
    }
}

impl FromStr for BridgePair {
    type Err = PortError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => Err(PortError::InvalidBridgeArgs(format!(
                "unknown bridge pair {s:?}, expected A, B or C"
            ))),
        }
    }
}

// ─── BridgeCommand ──────────────────────────────────────────────────

/// Drive command for one H-bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeCommand {
    /// First channel high, second low.
    Left,
    /// First channel low, second high.
    Right,
    /// Both channels high (motor terminals shorted).
    Brake,
    /// Both channels low (motor freewheels).
    Coast,
}

impl BridgeCommand {
    /// All commands.
    pub const ALL: [BridgeCommand; 4] = [
        BridgeCommand::Left,
        BridgeCommand::Right,
        BridgeCommand::Brake,
        BridgeCommand::Coast,
    ];

    /// Output levels (first, second) this command leaves on a pair.
    pub const fn levels(self) -> (bool, bool) {
        match self {
            Self::Left => (true, false),
            Self::Right => (false, true),
            Self::Brake => (true, true),
            Self::Coast => (false, false),
        }
    }
}

impl fmt::Display for BridgeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "LEFT"),
            Self::Right => write!(f, "RIGHT"),
            Self::Brake => write!(f, "BRAKE"),
            Self::Coast => write!(f, "COAST"),
        }
    }
}

impl FromStr for BridgeCommand {
    type Err = PortError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LEFT" => Ok(Self::Left),
            "R" | "RIGHT" => Ok(Self::Right),
            "B" | "BRAKE" => Ok(Self::Brake),
            "C" | "COAST" => Ok(Self::Coast),
            _ => Err(PortError::InvalidBridgeArgs(format!(
                "unknown bridge command {s:?}, expected LEFT, RIGHT, BRAKE or COAST"
            ))),
        }
    }
}
