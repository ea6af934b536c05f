//! Shared fixtures for unit tests.

use std::time::Duration;
use turtle_common::io::register::PortRegister;

use crate::clock::Clock;
use crate::drivers::simulation::{PortProbe, SimulatedPort};

/// Open a zeroed register on a simulated port; write history starts empty.
pub(crate) fn sim_register(input_pattern: &[u8]) -> (PortRegister, PortProbe) {
    let port = SimulatedPort::new("SIMTEST", input_pattern);
    let probe = port.probe();
    let mut register = PortRegister::open(Box::new(port)).expect("open simulated port");
    register.zero_all().expect("zero outputs");
    probe.clear_writes();
    (register, probe)
}

/// Clock that records requested delays instead of sleeping.
#[derive(Debug, Default)]
pub(crate) struct RecordingClock {
    pub(crate) sleeps: Vec<Duration>,
}

impl Clock for RecordingClock {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}
