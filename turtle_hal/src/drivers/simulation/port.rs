//! Simulated bit-bang port.
//!
//! `SimulatedPort` behaves like the FT232R in bit-bang mode: output pins
//! follow the last write where the direction mask says "output", input pins
//! follow a scripted pattern. A cloneable `PortProbe` shares the same state
//! so tests and tooling can inspect writes and steer the sensor lines while
//! the port itself is owned by a `PortRegister`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace};
use turtle_common::device::PortDevice;
use turtle_common::error::PortError;

/// Number of port writes kept in the history ring.
pub const HISTORY_CAPACITY: usize = 4096;

/// Input level reported when no pattern is configured: both sensors high.
const IDLE_INPUTS: u8 = 0xC0;

/// Shared simulation state.
#[derive(Debug)]
struct SimState {
    /// Latched direction mask (None until `set_direction`)
    direction: Option<u8>,
    /// Output latch
    latch: u8,
    /// Input levels currently presented on the pins
    inputs: u8,
    /// Scripted input sequence, advanced on every read
    pattern: Vec<u8>,
    /// Next pattern index
    pattern_pos: usize,
    /// Fixed input override (takes precedence over the pattern)
    forced_inputs: Option<u8>,
    /// Most recent writes, oldest first
    history: VecDeque<u8>,
    /// Total writes since open
    write_count: u64,
    /// Total reads since open
    read_count: u64,
    /// Fail every access once this many writes succeeded
    fail_after_writes: Option<u64>,
    /// Device closed
    closed: bool,
}

impl SimState {
    fn check_online(&self) -> Result<(), PortError> {
        if self.closed {
            return Err(PortError::DeviceUnavailable("device closed".to_string()));
        }
        if let Some(limit) = self.fail_after_writes {
            if self.write_count >= limit {
                return Err(PortError::DeviceUnavailable(format!(
                    "simulated USB failure after {limit} writes"
                )));
            }
        }
        Ok(())
    }

    fn port_value(&self) -> u8 {
        let direction = self.direction.unwrap_or(0);
        (self.latch & direction) | (self.inputs & !direction)
    }
}

/// Software implementation of the bit-bang port.
pub struct SimulatedPort {
    serial: String,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedPort {
    /// Create a port whose input pins replay `input_pattern` on every read.
    pub fn new(serial: &str, input_pattern: &[u8]) -> Self {
        debug!(
            "Simulated port {} created with {}-step input pattern",
            serial,
            input_pattern.len()
        );
        Self {
            serial: serial.to_string(),
            state: Arc::new(Mutex::new(SimState {
                direction: None,
                latch: 0,
                inputs: input_pattern.first().copied().unwrap_or(IDLE_INPUTS),
                pattern: input_pattern.to_vec(),
                pattern_pos: 0,
                forced_inputs: None,
                history: VecDeque::with_capacity(HISTORY_CAPACITY),
                write_count: 0,
                read_count: 0,
                fail_after_writes: None,
                closed: false,
            })),
        }
    }

    /// Handle sharing this port's state.
    pub fn probe(&self) -> PortProbe {
        PortProbe {
            state: Arc::clone(&self.state),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        // A poisoned lock only means a test thread panicked mid-access; the
        // plain-data state is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PortDevice for SimulatedPort {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn serial(&self) -> &str {
        &self.serial
    }

    fn set_direction(&mut self, mask: u8) -> Result<(), PortError> {
        let mut state = self.state();
        state.check_online()?;
        state.direction = Some(mask);
        debug!("Direction mask set to 0x{:02X}", mask);
        Ok(())
    }

    fn read_port(&mut self) -> Result<u8, PortError> {
        let mut state = self.state();
        state.check_online()?;
        let inputs = match state.forced_inputs {
            Some(forced) => forced,
            None if state.pattern.is_empty() => IDLE_INPUTS,
            None => {
                let value = state.pattern[state.pattern_pos];
                state.pattern_pos = (state.pattern_pos + 1) % state.pattern.len();
                value
            }
        };
        state.inputs = inputs;
        state.read_count += 1;
        Ok(state.port_value())
    }

    fn write_port(&mut self, value: u8) -> Result<u8, PortError> {
        let mut state = self.state();
        state.check_online()?;
        state.latch = value;
        if state.history.len() == HISTORY_CAPACITY {
            state.history.pop_front();
        }
        state.history.push_back(value);
        state.write_count += 1;
        trace!("Simulated port latch 0x{:02X}", value);
        Ok(state.port_value())
    }

    fn close(&mut self) -> Result<(), PortError> {
        let mut state = self.state();
        state.closed = true;
        debug!(
            "Simulated port {} closed after {} writes, {} reads",
            self.serial, state.write_count, state.read_count
        );
        Ok(())
    }
}

/// Cloneable view into a `SimulatedPort`.
#[derive(Clone)]
pub struct PortProbe {
    state: Arc<Mutex<SimState>>,
}

impl PortProbe {
    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Hold the input pins at `inputs` until `release_inputs()`.
    pub fn force_inputs(&self, inputs: u8) {
        let mut state = self.state();
        state.forced_inputs = Some(inputs);
        state.inputs = inputs;
    }

    /// Resume replaying the input pattern.
    pub fn release_inputs(&self) {
        self.state().forced_inputs = None;
    }

    /// Make every access fail once `writes` more writes have succeeded.
    pub fn fail_after_writes(&self, writes: u64) {
        let mut state = self.state();
        state.fail_after_writes = Some(state.write_count + writes);
    }

    /// Latched direction mask.
    pub fn direction(&self) -> Option<u8> {
        self.state().direction
    }

    /// Current output latch.
    pub fn latch(&self) -> u8 {
        self.state().latch
    }

    /// Current full pin state as a read would report it.
    pub fn port_value(&self) -> u8 {
        self.state().port_value()
    }

    /// Recent writes, oldest first.
    pub fn writes(&self) -> Vec<u8> {
        self.state().history.iter().copied().collect()
    }

    /// Forget recorded writes.
    pub fn clear_writes(&self) {
        self.state().history.clear();
    }

    /// Total writes since open.
    pub fn write_count(&self) -> u64 {
        self.state().write_count
    }

    /// Total reads since open.
    pub fn read_count(&self) -> u64 {
        self.state().read_count
    }

    /// Whether the port has been closed.
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}
