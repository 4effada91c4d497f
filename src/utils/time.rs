//! Time sources.
//!
//! Core operations take explicit `u64` UNIX-second timestamps so they stay
//! pure and replayable; the [`Clock`] trait exists for callers that need
//! ambient time.

/// Capability trait for reading the current time
pub trait Clock {
    /// Current UNIX time in seconds
    fn now(&self) -> u64;
}

/// Wall-clock time via chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Deterministic clock for tests and simulations
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    seconds: u64,
}

impl ManualClock {
    /// Create a clock frozen at the given UNIX time
    pub fn new(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Move the clock forward
    pub fn advance(&mut self, seconds: u64) {
        self.seconds += seconds;
    }

    /// Jump to an absolute time
    pub fn set(&mut self, seconds: u64) {
        self.seconds = seconds;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now(), 1_500);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_system_clock_is_sane() {
        // 2020-01-01 as a floor
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
