//! Maneuver sequencer: pulse-and-coast drive patterns for the two tracks.
//!
//! Every maneuver drives bridge A (left track) and bridge B (right track),
//! holds for `command_delay`, then coasts both. Keeping the pulse short
//! bounds the current through the motor windings; the delay is a timing
//! contract, not a tuning knob.
//!
//! | Maneuver   | Pair A | Pair B |
//! |------------|--------|--------|
//! | Forward    | LEFT   | LEFT   |
//! | Backward   | RIGHT  | RIGHT  |
//! | PivotLeft  | LEFT   | RIGHT  |
//! | PivotRight | RIGHT  | LEFT   |

use std::fmt;
use std::time::Duration;
use tracing::trace;
use turtle_common::error::PortError;
use turtle_common::io::bridge::{BridgeCommand, BridgePair};
use turtle_common::io::register::PortRegister;

use crate::bridge::apply_bridge;
use crate::clock::Clock;

/// Named two-track maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Maneuver {
    /// Both tracks forward.
    Forward,
    /// Both tracks backward.
    Backward,
    /// Turn in place counter-clockwise.
    PivotLeft,
    /// Turn in place clockwise.
    PivotRight,
}

impl Maneuver {
    /// All maneuvers.
    pub const ALL: [Maneuver; 4] = [
        Maneuver::Forward,
        Maneuver::Backward,
        Maneuver::PivotLeft,
        Maneuver::PivotRight,
    ];

    /// Bridge commands (pair A, pair B) applied during the pulse.
    pub const fn commands(self) -> (BridgeCommand, BridgeCommand) {
        match self {
            Self::Forward => (BridgeCommand::Left, BridgeCommand::Left),
            Self::Backward => (BridgeCommand::Right, BridgeCommand::Right),
            Self::PivotLeft => (BridgeCommand::Left, BridgeCommand::Right),
            Self::PivotRight => (BridgeCommand::Right, BridgeCommand::Left),
        }
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Backward => write!(f, "backward"),
            Self::PivotLeft => write!(f, "pivot-left"),
            Self::PivotRight => write!(f, "pivot-right"),
        }
    }
}

/// Executes maneuvers with a fixed pulse hold.
#[derive(Debug, Clone, Copy)]
pub struct Sequencer {
    command_delay: Duration,
}

impl Sequencer {
    /// Create a sequencer holding each pulse for `command_delay`.
    pub fn new(command_delay: Duration) -> Self {
        Self { command_delay }
    }

    /// Pulse hold.
    #[inline]
    pub fn command_delay(&self) -> Duration {
        self.command_delay
    }

    /// Pulse, hold, coast.
    ///
    /// A device error aborts the maneuver immediately and is returned as is;
    /// the owning loop is responsible for driving the outputs low.
    pub fn execute(
        &self,
        register: &mut PortRegister,
        clock: &mut dyn Clock,
        maneuver: Maneuver,
    ) -> Result<(), PortError> {
        let (a, b) = maneuver.commands();
        trace!("Maneuver {} ({:?})", maneuver, self.command_delay);
        apply_bridge(register, BridgePair::A, a)?;
        apply_bridge(register, BridgePair::B, b)?;
        clock.sleep(self.command_delay);
        apply_bridge(register, BridgePair::A, BridgeCommand::Coast)?;
        apply_bridge(register, BridgePair::B, BridgeCommand::Coast)
    }

    /// Both tracks forward for one pulse.
    pub fn forward(&self, register: &mut PortRegister, clock: &mut dyn Clock) -> Result<(), PortError> {
        self.execute(register, clock, Maneuver::Forward)
    }

    /// Both tracks backward for one pulse.
    pub fn backward(&self, register: &mut PortRegister, clock: &mut dyn Clock) -> Result<(), PortError> {
        self.execute(register, clock, Maneuver::Backward)
    }

    /// Pivot counter-clockwise for one pulse.
    pub fn pivot_left(&self, register: &mut PortRegister, clock: &mut dyn Clock) -> Result<(), PortError> {
        self.execute(register, clock, Maneuver::PivotLeft)
    }

    /// Pivot clockwise for one pulse.
    pub fn pivot_right(&self, register: &mut PortRegister, clock: &mut dyn Clock) -> Result<(), PortError> {
        self.execute(register, clock, Maneuver::PivotRight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sim_register, RecordingClock};

    const PULSE: Duration = Duration::from_millis(5);

    #[test]
    fn forward_then_backward_leave_both_pairs_coasting() {
        let (mut reg, probe) = sim_register(&[]);
        let mut clock = RecordingClock::default();
        let seq = Sequencer::new(PULSE);

        seq.forward(&mut reg, &mut clock).unwrap();
        assert_eq!(reg.value() & 0x0F, 0);
        seq.backward(&mut reg, &mut clock).unwrap();
        assert_eq!(reg.value() & 0x0F, 0);
        assert_eq!(probe.latch() & 0x0F, 0);
        assert_eq!(clock.sleeps, vec![PULSE, PULSE]);
    }

    #[test]
    fn pulse_state_matches_table() {
        let expected = [
            (Maneuver::Forward, 0x05),
            (Maneuver::Backward, 0x0A),
            (Maneuver::PivotLeft, 0x09),
            (Maneuver::PivotRight, 0x06),
        ];
        for (maneuver, pulse) in expected {
            let (mut reg, probe) = sim_register(&[]);
            let mut clock = RecordingClock::default();
            Sequencer::new(PULSE).execute(&mut reg, &mut clock, maneuver).unwrap();

            let writes = probe.writes();
            assert_eq!(writes.len(), 8, "{maneuver}");
            assert_eq!(writes[3], pulse, "{maneuver}");
            assert_eq!(writes[7], 0x00, "{maneuver}");
        }
    }

    #[test]
    fn pair_c_is_untouched() {
        let (mut reg, _probe) = sim_register(&[]);
        apply_bridge(&mut reg, BridgePair::C, BridgeCommand::Brake).unwrap();
        let mut clock = RecordingClock::default();
        let seq = Sequencer::new(PULSE);
        for maneuver in Maneuver::ALL {
            seq.execute(&mut reg, &mut clock, maneuver).unwrap();
            assert_eq!(reg.value() & 0x3F, 0x30);
        }
    }

    #[test]
    fn device_failure_aborts_before_hold() {
        let (mut reg, probe) = sim_register(&[]);
        let mut clock = RecordingClock::default();
        probe.fail_after_writes(2);

        let result = Sequencer::new(PULSE).pivot_right(&mut reg, &mut clock);
        assert!(matches!(result, Err(PortError::DeviceUnavailable(_))));
        assert!(clock.sleeps.is_empty());
        assert_eq!(probe.writes().len(), 2);
    }
}
