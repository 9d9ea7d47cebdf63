//! Virtual clock for playback sessions
//!
//! The virtual clock maps wall-clock time onto simulated sequence time.
//! While running, virtual time advances at `speed` times wall-clock rate:
//!
//! ```text
//! virtual_now = accumulated_ms + speed * (now - resumed_at)
//! ```
//!
//! Pausing folds the elapsed contribution into `accumulated_ms` and drops
//! the resume instant, freezing the clock. Speed changes fold first and
//! switch rate second, so virtual time never jumps across a `set_speed`.
//! All methods take the current [`Instant`] as an argument, which keeps
//! the arithmetic deterministic and testable without sleeping.

use std::time::{Duration, Instant};

/// Virtual clock: accumulated virtual milliseconds plus a running segment
#[derive(Debug, Clone)]
pub struct VirtualClock {
    /// Virtual milliseconds accumulated over completed running segments
    accumulated_ms: f64,
    /// Current speed multiplier (> 0)
    speed: f64,
    /// Wall-clock instant of the last resume; None while not running
    resumed_at: Option<Instant>,
}

impl VirtualClock {
    /// Create a frozen clock at virtual time zero
    pub fn new(speed: f64) -> Self {
        debug_assert!(speed > 0.0);
        Self {
            accumulated_ms: 0.0,
            speed,
            resumed_at: None,
        }
    }

    /// Current speed multiplier
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Whether the clock is currently advancing
    pub fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }

    /// Virtual milliseconds elapsed since sequence start
    pub fn virtual_now(&self, now: Instant) -> f64 {
        match self.resumed_at {
            Some(resumed_at) => {
                let wall_ms = now.saturating_duration_since(resumed_at).as_secs_f64() * 1000.0;
                self.accumulated_ms + self.speed * wall_ms
            }
            None => self.accumulated_ms,
        }
    }

    /// Start advancing from the current accumulated virtual time
    pub fn resume(&mut self, now: Instant) {
        if self.resumed_at.is_none() {
            self.resumed_at = Some(now);
        }
    }

    /// Freeze the clock, folding the running segment into the accumulator
    pub fn pause(&mut self, now: Instant) {
        self.accumulated_ms = self.virtual_now(now);
        self.resumed_at = None;
    }

    /// Change the speed multiplier without losing virtual time
    ///
    /// Folds the elapsed contribution at the old speed into the
    /// accumulator, then restarts the running segment at the new speed.
    pub fn set_speed(&mut self, multiplier: f64, now: Instant) {
        debug_assert!(multiplier > 0.0);
        if self.resumed_at.is_some() {
            self.accumulated_ms = self.virtual_now(now);
            self.resumed_at = Some(now);
        }
        self.speed = multiplier;
    }

    /// Move the clock to an absolute virtual time (forward or backward)
    pub fn jump_to(&mut self, target_ms: f64, now: Instant) {
        self.accumulated_ms = target_ms;
        if self.resumed_at.is_some() {
            self.resumed_at = Some(now);
        }
    }

    /// Reset to virtual time zero, frozen
    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
        self.resumed_at = None;
    }

    /// Wall-clock delay until the given virtual timestamp falls due
    ///
    /// Returns zero when the target is already past.
    pub fn wall_delay_until(&self, target_ms: f64, now: Instant) -> Duration {
        let remaining_virtual = target_ms - self.virtual_now(now);
        if remaining_virtual <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(remaining_virtual / self.speed / 1000.0)
    }
}
