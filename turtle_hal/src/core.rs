//! Turtle core: device lifecycle and the two control loops.
//!
//! `TurtleCore` is the single owner of the `PortRegister`. Exactly one loop
//! runs at a time; both stop at the next cycle boundary once the running
//! flag is cleared (signal handler or `shutdown()`), and both leave every
//! output low on exit, including error exits.

use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use turtle_common::config::TurtleConfig;
use turtle_common::io::register::PortRegister;

use crate::clock::Clock;
use crate::console::{Console, ConsoleOutcome};
use crate::driver_registry::DriverRegistry;
use crate::error::CoreError;
use crate::keyboard::KeySource;
use crate::maneuver::Sequencer;
use crate::navigation::Navigator;

/// Core lifecycle and loop management.
pub struct TurtleCore {
    /// Validated configuration
    config: TurtleConfig,
    /// Available device drivers
    registry: DriverRegistry,
    /// Open port (after `init`)
    register: Option<PortRegister>,
    /// Running flag for loop control
    running: Arc<AtomicBool>,
    /// Timing statistics of the last loop run
    stats: LoopStats,
}

/// Per-run loop statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    /// Number of cycles executed
    pub cycle_count: u64,
    /// Maneuvers executed (navigation only)
    pub maneuver_count: u64,
    /// Cycles whose work took longer than the loop delay
    pub slow_cycles: u64,
    /// Maximum observed cycle work time
    pub max_cycle_time_us: u64,
    /// Sum of cycle work times for average calculation
    pub total_cycle_time_us: u64,
}

impl LoopStats {
    fn record(&mut self, work: Duration, loop_delay: Duration) {
        let us = work.as_micros() as u64;
        self.cycle_count += 1;
        self.total_cycle_time_us += us;
        self.max_cycle_time_us = self.max_cycle_time_us.max(us);
        if work > loop_delay {
            self.slow_cycles += 1;
        }
    }

    /// Average cycle work time in microseconds.
    pub fn avg_cycle_time_us(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.total_cycle_time_us / self.cycle_count
        }
    }
}

/// Mutable borrow of the register that drives every output low when dropped.
struct IdleOnDrop<'a> {
    register: &'a mut PortRegister,
}

impl Deref for IdleOnDrop<'_> {
    type Target = PortRegister;
    fn deref(&self) -> &PortRegister {
        self.register
    }
}

impl DerefMut for IdleOnDrop<'_> {
    fn deref_mut(&mut self) -> &mut PortRegister {
        self.register
    }
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.register.zero_all() {
            warn!("Failed to zero outputs on loop exit: {}", e);
        }
    }
}

impl TurtleCore {
    /// Create a core for `config`, opening devices through `registry`.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the configuration is invalid.
    pub fn new(config: TurtleConfig, registry: DriverRegistry) -> Result<Self, CoreError> {
        config.validate()?;
        info!(
            "TurtleCore created: driver={}, serial={}, command_delay={}us, loop_delay={}ms",
            config.device.driver,
            config.device.serial,
            config.timing.command_delay_us,
            config.timing.loop_delay_ms
        );
        Ok(Self {
            config,
            registry,
            register: None,
            running: Arc::new(AtomicBool::new(true)),
            stats: LoopStats::default(),
        })
    }

    /// Open the device, latch the direction mask and zero all outputs.
    ///
    /// # Errors
    /// `PortError::DriverNotFound` / `PortError::DeviceUnavailable` wrapped
    /// in `CoreError::Port`.
    pub fn init(&mut self) -> Result<(), CoreError> {
        let device = &self.config.device;
        info!("Opening device {} via driver '{}'...", device.serial, device.driver);

        let handle = self.registry.open(
            &device.driver,
            &device.serial,
            &self.config.simulation.input_pattern,
        )?;
        let mut register = PortRegister::open(handle)?;
        register.zero_all()?;

        info!(
            "Device {} ready on {} (direction=0x{:02X})",
            register.serial(),
            register.device_name(),
            register.direction()
        );
        self.register = Some(register);
        Ok(())
    }

    /// Run the reflex navigation loop until the running flag clears.
    ///
    /// # Errors
    /// Any device error stops the loop; outputs are zeroed before returning.
    pub fn run_navigation(&mut self, clock: &mut dyn Clock) -> Result<(), CoreError> {
        let register = self.register.as_mut().ok_or(CoreError::NotInitialized)?;
        let loop_delay = self.config.timing.loop_delay();
        let mut navigator = Navigator::new(Sequencer::new(self.config.timing.command_delay()));
        let mut port = IdleOnDrop { register };
        self.stats = LoopStats::default();

        info!("Starting navigation loop (loop_delay={:?})", loop_delay);
        while self.running.load(Ordering::SeqCst) {
            let cycle_start = Instant::now();
            if let Err(e) = navigator.tick(&mut port, clock) {
                error!("Navigation aborted after {} cycles: {}", navigator.cycles(), e);
                return Err(e.into());
            }
            self.stats.record(cycle_start.elapsed(), loop_delay);
            self.stats.maneuver_count = navigator.maneuvers();
            clock.sleep(loop_delay);
        }

        info!(
            "Navigation loop stopped after {} cycles ({} corrections, {} maneuvers, {} overruns, avg={}us, max={}us)",
            navigator.cycles(),
            navigator.corrections(),
            navigator.maneuvers(),
            self.stats.slow_cycles,
            self.stats.avg_cycle_time_us(),
            self.stats.max_cycle_time_us
        );
        Ok(())
    }

    /// Run the manual console loop until quit or the running flag clears.
    ///
    /// One status line per cycle is written to `out`, rewritten in place.
    ///
    /// # Errors
    /// Device, keyboard or output errors stop the loop; outputs are zeroed
    /// before returning.
    pub fn run_console(
        &mut self,
        keys: &mut dyn KeySource,
        clock: &mut dyn Clock,
        out: &mut dyn Write,
    ) -> Result<(), CoreError> {
        let register = self.register.as_mut().ok_or(CoreError::NotInitialized)?;
        let loop_delay = self.config.timing.loop_delay();
        let mut console = Console::new();
        let mut port = IdleOnDrop { register };
        self.stats = LoopStats::default();

        info!("Starting console loop (loop_delay={:?})", loop_delay);
        while self.running.load(Ordering::SeqCst) {
            let cycle_start = Instant::now();
            let key = keys.poll_key()?;
            match console.tick(&mut port, key)? {
                ConsoleOutcome::Quit => {
                    info!("Quit requested from console");
                    break;
                }
                ConsoleOutcome::Continue(status) => {
                    write!(out, "{status}          \r")?;
                    out.flush()?;
                }
            }
            self.stats.record(cycle_start.elapsed(), loop_delay);
            clock.sleep(loop_delay);
        }
        writeln!(out)?;

        let counters = console.counters();
        info!(
            "Console loop stopped after {} cycles ({} overruns, avg={}us, max={}us, counters 7: {}, 6: {})",
            console.cycles(),
            self.stats.slow_cycles,
            self.stats.avg_cycle_time_us(),
            self.stats.max_cycle_time_us,
            counters.in7,
            counters.in6
        );
        Ok(())
    }

    /// Stop any loop, zero outputs and release the device.
    pub fn shutdown(&mut self) -> Result<(), CoreError> {
        info!("Shutdown requested");
        self.running.store(false, Ordering::SeqCst);

        if let Some(mut register) = self.register.take() {
            if let Err(e) = register.zero_all() {
                warn!("Failed to zero outputs on shutdown: {}", e);
            }
            register.close()?;
            debug!("Device {} closed", register.serial());
        }
        Ok(())
    }

    /// Shut down after a loop run and return the loop's own result.
    ///
    /// A shutdown failure is only returned when the loop succeeded;
    /// otherwise it is logged and the loop error wins.
    pub fn finish(&mut self, result: Result<(), CoreError>) -> Result<(), CoreError> {
        if let Err(e) = &result {
            error!("Control loop error: {}", e);
        }
        match self.shutdown() {
            Ok(()) => result,
            Err(e) if result.is_err() => {
                warn!("Shutdown after loop error failed: {}", e);
                result
            }
            Err(e) => Err(e),
        }
    }

    /// Get the running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Open register, if initialized.
    pub fn register(&self) -> Option<&PortRegister> {
        self.register.as_ref()
    }

    /// Active configuration.
    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Statistics of the last loop run.
    pub fn stats(&self) -> LoopStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOP_DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn stats_count_overruns() {
        let mut stats = LoopStats::default();
        stats.record(Duration::from_millis(10), LOOP_DELAY);
        stats.record(Duration::from_millis(150), LOOP_DELAY);
        stats.record(LOOP_DELAY, LOOP_DELAY);

        assert_eq!(stats.cycle_count, 3);
        assert_eq!(stats.slow_cycles, 1);
        assert_eq!(stats.max_cycle_time_us, 150_000);
        assert_eq!(stats.avg_cycle_time_us(), 260_000 / 3);
    }

    #[test]
    fn empty_stats_average_is_zero() {
        assert_eq!(LoopStats::default().avg_cycle_time_us(), 0);
    }
}
