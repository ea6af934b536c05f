//! Manual override console.
//!
//! One key per cycle is mapped to a `ConsoleAction` by [`dispatch`]:
//!
//! ```text
//!   1-6        toggle OUT0-OUT5
//!   A S Z X    bridge A: left, right, coast, brake
//!   D F C V    bridge B: left, right, coast, brake
//!   G H B N    bridge C: left, right, coast, brake
//!   0          reset transition counters
//!   Q / ESC    quit
//! ```
//!
//! Letters are case-insensitive. Bridge commands hold until the next key;
//! there is no timed coast-back in manual mode.

use std::fmt;
use tracing::debug;
use turtle_common::error::PortError;
use turtle_common::io::bridge::{BridgeCommand, BridgePair};
use turtle_common::io::channel::{OutputChannel, SensorSample};
use turtle_common::io::register::PortRegister;

use crate::bridge::apply_bridge;

/// Escape key code.
pub const KEY_ESCAPE: u8 = 0x1B;

/// Key help printed before the console starts.
pub const HELP: &str = "Use keys '1'-'6' to toggle outputs, [ASZX] [DFCV] [GHBN] for bridges A/B/C \
(left/right/coast/brake), '0' to reset counters, 'Q'/ESC to quit";

/// Decoded key action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    /// Invert one output channel.
    ToggleChannel(OutputChannel),
    /// Apply a bridge command and hold it.
    Bridge(BridgePair, BridgeCommand),
    /// Zero both transition counters.
    ResetCounters,
    /// Leave the console loop.
    Quit,
}

/// Map a raw key code to its action; `None` for unmapped keys.
pub fn dispatch(key: u8) -> Option<ConsoleAction> {
    use BridgeCommand::{Brake, Coast, Left, Right};
    use BridgePair::{A, B, C};

    let bridge = |pair, command| Some(ConsoleAction::Bridge(pair, command));
    match key.to_ascii_lowercase() {
        b'1'..=b'6' => OutputChannel::new(key - b'1')
            .ok()
            .map(ConsoleAction::ToggleChannel),
        b'a' => bridge(A, Left),
        b's' => bridge(A, Right),
        b'z' => bridge(A, Coast),
        b'x' => bridge(A, Brake),
        b'd' => bridge(B, Left),
        b'f' => bridge(B, Right),
        b'c' => bridge(B, Coast),
        b'v' => bridge(B, Brake),
        b'g' => bridge(C, Left),
        b'h' => bridge(C, Right),
        b'b' => bridge(C, Coast),
        b'n' => bridge(C, Brake),
        b'0' => Some(ConsoleAction::ResetCounters),
        b'q' | KEY_ESCAPE => Some(ConsoleAction::Quit),
        _ => None,
    }
}

/// Per-sensor count of polls that read low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionCounters {
    /// Low reads on IN6.
    pub in6: u64,
    /// Low reads on IN7.
    pub in7: u64,
}

impl TransitionCounters {
    /// Count every sensor that reads low in `sample`.
    pub fn record(&mut self, sample: SensorSample) {
        if !sample.in6 {
            self.in6 += 1;
        }
        if !sample.in7 {
            self.in7 += 1;
        }
    }

    /// Zero both counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Status reported after each console cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleStatus {
    /// Sensor levels of this cycle.
    pub sample: SensorSample,
    /// Counters after this cycle.
    pub counters: TransitionCounters,
}

impl fmt::Display for ConsoleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IN7: {} IN6: {}  Counters 7: {} 6: {}",
            u8::from(self.sample.in7),
            u8::from(self.sample.in6),
            self.counters.in7,
            self.counters.in6
        )
    }
}

/// Outcome of one console cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutcome {
    /// Keep running; report this status.
    Continue(ConsoleStatus),
    /// Quit was requested. Sensors were not polled.
    Quit,
}

/// Step function of the console loop.
#[derive(Debug, Default)]
pub struct Console {
    counters: TransitionCounters,
    cycles: u64,
}

impl Console {
    /// Create a console with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one cycle: dispatch at most one key, then poll the sensors.
    pub fn tick(
        &mut self,
        register: &mut PortRegister,
        key: Option<u8>,
    ) -> Result<ConsoleOutcome, PortError> {
        if let Some(action) = key.and_then(dispatch) {
            debug!("Key 0x{:02X} -> {:?}", key.unwrap_or_default(), action);
            match action {
                ConsoleAction::ToggleChannel(channel) => register.toggle_channel(channel.index())?,
                ConsoleAction::Bridge(pair, command) => apply_bridge(register, pair, command)?,
                ConsoleAction::ResetCounters => self.counters.reset(),
                ConsoleAction::Quit => return Ok(ConsoleOutcome::Quit),
            }
        }

        let sample = register.sample()?;
        self.counters.record(sample);
        self.cycles += 1;
        Ok(ConsoleOutcome::Continue(ConsoleStatus {
            sample,
            counters: self.counters,
        }))
    }

    /// Current counters.
    pub fn counters(&self) -> TransitionCounters {
        self.counters
    }

    /// Completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}
