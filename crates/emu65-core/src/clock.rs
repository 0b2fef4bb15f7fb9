//! Host clock pacing.
//!
//! The pacer busy-waits on the monotonic host clock and feeds the CPU one
//! cycle per period, so the emulated machine advances at a configured
//! frequency instead of as fast as the host allows. The loop watches a
//! shared running flag; clearing it from any thread ends the loop at the
//! next cycle boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::emulator::Emulator;

/// Paces an [`Emulator`] against the host's monotonic clock.
pub struct Clock {
    running: Arc<AtomicBool>,
}

impl Clock {
    /// A stopped clock.
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle to the running flag, for stopping the loop from another
    /// thread or a signal context.
    pub fn running_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Clear the running flag; a loop in [`Clock::run`] exits at its next
    /// cycle boundary.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Drive the emulator at `target_hz` cycles per second until stopped.
    ///
    /// Each cycle costs `1_000_000 / target_hz` microseconds of wall time,
    /// enforced by spinning on [`Instant`]; at rates above 1 MHz the period
    /// rounds to zero and the loop runs unpaced.
    pub fn run(&self, emulator: &mut Emulator, target_hz: u64) {
        let period = Duration::from_micros(1_000_000 / target_hz.max(1));
        let mut deadline = Instant::now();

        self.running.store(true, Ordering::Relaxed);
        while self.running.load(Ordering::Relaxed) {
            emulator.clock();

            deadline += period;
            while Instant::now() < deadline {
                std::hint::spin_loop();
            }
        }
    }

    /// Power-on reset sequence: assert RESET, clock once so the CPU
    /// services it, release.
    pub fn reset(emulator: &mut Emulator) {
        emulator.set_reset(true);
        emulator.clock();
        emulator.set_reset(false);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
