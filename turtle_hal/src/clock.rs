//! Scheduling seam for the control loops.
//!
//! Loops and maneuvers never call `std::thread::sleep` directly; they ask a
//! `Clock`. The binary uses `SystemClock`, tests substitute a clock that
//! records the requested delays and returns immediately.

use std::time::Duration;

/// Source of scheduled delays.
pub trait Clock {
    /// Block for `duration`. Not cancellable once started.
    fn sleep(&mut self, duration: Duration);
}

/// Wall-clock implementation yielding the thread to the OS scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
