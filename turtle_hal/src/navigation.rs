//! Reflex navigation.
//!
//! A memoryless policy over the primary sensor (IN6), which sees the
//! black-to-white edge of a track line:
//!
//! - IN6 low: six `pivot_right` pulses in a row (correction burst)
//! - IN6 high: one `forward` then one `pivot_left` (advance and drift left)
//!
//! Nothing carries over between cycles except statistics.

use tracing::debug;
use turtle_common::consts::CORRECTION_BURST;
use turtle_common::error::PortError;
use turtle_common::io::channel::SensorSample;
use turtle_common::io::register::PortRegister;

use crate::clock::Clock;
use crate::maneuver::{Maneuver, Sequencer};

const BURST: [Maneuver; CORRECTION_BURST] = [Maneuver::PivotRight; CORRECTION_BURST];
const ADVANCE: [Maneuver; 2] = [Maneuver::Forward, Maneuver::PivotLeft];

/// What one navigation cycle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationAction {
    /// Primary sensor low: hard right correction.
    CorrectionBurst,
    /// Primary sensor high: advance, then drift left.
    AdvanceAndDrift,
}

impl NavigationAction {
    /// Maneuvers executed for this action, in order.
    pub fn maneuvers(self) -> &'static [Maneuver] {
        match self {
            Self::CorrectionBurst => &BURST,
            Self::AdvanceAndDrift => &ADVANCE,
        }
    }
}

/// Map a sensor sample to an action.
pub fn decide(sample: SensorSample) -> NavigationAction {
    if sample.primary_low() {
        NavigationAction::CorrectionBurst
    } else {
        NavigationAction::AdvanceAndDrift
    }
}

/// Result of one navigation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationStep {
    /// Sample the decision was based on.
    pub sample: SensorSample,
    /// Action taken.
    pub action: NavigationAction,
}

/// Step function of the navigation loop.
///
/// `tick` samples, decides and acts; the caller owns the inter-cycle delay.
#[derive(Debug)]
pub struct Navigator {
    sequencer: Sequencer,
    cycles: u64,
    corrections: u64,
    maneuvers: u64,
}

impl Navigator {
    /// Create a navigator using `sequencer` for every maneuver.
    pub fn new(sequencer: Sequencer) -> Self {
        Self {
            sequencer,
            cycles: 0,
            corrections: 0,
            maneuvers: 0,
        }
    }

    /// Run one cycle: read sensors, pick an action, execute its maneuvers.
    ///
    /// Outputs are back in COAST when this returns `Ok`.
    pub fn tick(
        &mut self,
        register: &mut PortRegister,
        clock: &mut dyn Clock,
    ) -> Result<NavigationStep, PortError> {
        let sample = register.sample()?;
        let action = decide(sample);
        debug!(
            "Cycle {}: IN7={} IN6={} -> {:?}",
            self.cycles,
            u8::from(sample.in7),
            u8::from(sample.in6),
            action
        );

        for &maneuver in action.maneuvers() {
            self.sequencer.execute(register, clock, maneuver)?;
            self.maneuvers += 1;
        }

        self.cycles += 1;
        if action == NavigationAction::CorrectionBurst {
            self.corrections += 1;
        }
        Ok(NavigationStep { sample, action })
    }

    /// Completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycles that ran a correction burst.
    pub fn corrections(&self) -> u64 {
        self.corrections
    }

    /// Maneuvers executed.
    pub fn maneuvers(&self) -> u64 {
        self.maneuvers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sim_register, RecordingClock};
    use std::time::Duration;

    const PULSE: Duration = Duration::from_millis(5);

    /// Port state at the end of each maneuver's pulse (4th of 8 writes).
    fn pulses(writes: &[u8]) -> Vec<u8> {
        writes.chunks(8).map(|chunk| chunk[3]).collect()
    }

    #[test]
    fn decide_follows_primary_sensor_only() {
        let low = SensorSample { in6: false, in7: true };
        let high = SensorSample { in6: true, in7: false };
        assert_eq!(decide(low), NavigationAction::CorrectionBurst);
        assert_eq!(decide(high), NavigationAction::AdvanceAndDrift);
    }

    #[test]
    fn primary_low_runs_six_pivot_rights() {
        let (mut reg, probe) = sim_register(&[0x80]);
        let mut clock = RecordingClock::default();
        let mut nav = Navigator::new(Sequencer::new(PULSE));

        let step = nav.tick(&mut reg, &mut clock).unwrap();

        assert_eq!(step.action, NavigationAction::CorrectionBurst);
        assert_eq!(pulses(&probe.writes()), vec![0x06; 6]);
        assert_eq!(clock.sleeps, vec![PULSE; 6]);
        assert_eq!(probe.read_count(), 2);
        assert_eq!(nav.corrections(), 1);
        assert_eq!(nav.maneuvers(), 6);
    }

    #[test]
    fn primary_high_runs_forward_then_pivot_left() {
        let (mut reg, probe) = sim_register(&[0x40]);
        let mut clock = RecordingClock::default();
        let mut nav = Navigator::new(Sequencer::new(PULSE));

        let step = nav.tick(&mut reg, &mut clock).unwrap();

        assert_eq!(step.action, NavigationAction::AdvanceAndDrift);
        assert!(step.sample.in6);
        assert_eq!(pulses(&probe.writes()), vec![0x05, 0x09]);
        assert_eq!(clock.sleeps.len(), 2);
        assert_eq!(nav.corrections(), 0);
    }

    #[test]
    fn every_cycle_ends_idle() {
        // Opening the port consumes the first pattern step.
        let (mut reg, probe) = sim_register(&[0xC0, 0x00, 0x40, 0x80]);
        let mut clock = RecordingClock::default();
        let mut nav = Navigator::new(Sequencer::new(PULSE));

        let actions: Vec<NavigationAction> = (0..4)
            .map(|_| {
                let step = nav.tick(&mut reg, &mut clock).unwrap();
                assert_eq!(probe.latch() & 0x3F, 0);
                step.action
            })
            .collect();

        assert_eq!(
            actions,
            vec![
                NavigationAction::CorrectionBurst,
                NavigationAction::AdvanceAndDrift,
                NavigationAction::CorrectionBurst,
                NavigationAction::AdvanceAndDrift,
            ]
        );
        assert_eq!(nav.cycles(), 4);
        assert_eq!(nav.maneuvers(), 2 + 6 + 2 + 6);
    }

    #[test]
    fn device_failure_stops_the_cycle() {
        let (mut reg, probe) = sim_register(&[0x00]);
        let mut clock = RecordingClock::default();
        let mut nav = Navigator::new(Sequencer::new(PULSE));
        probe.fail_after_writes(10);

        assert!(matches!(
            nav.tick(&mut reg, &mut clock),
            Err(PortError::DeviceUnavailable(_))
        ));
        assert_eq!(nav.cycles(), 0);
        assert_eq!(nav.maneuvers(), 1);
    }
}
