//! Time source abstraction for the debounce scheduler.
//!
//! The debouncer never reads the wall clock directly; it asks a
//! [`Clock`] so tests can drive time deterministically.

use std::time::Duration;

/// Abstraction over time measurement.
pub trait Clock {
    /// Opaque instant type produced by this clock.
    type Instant: Copy;

    /// Current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since a previously captured instant.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn elapsed(&self, since: &Self::Instant) -> Duration {
        since.elapsed()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::Cell;
    use std::time::Duration;

    use super::Clock;

    /// Manually advanced clock for deterministic scheduler tests.
    /// Instants are milliseconds since clock creation.
    #[derive(Debug, Default)]
    pub struct FakeClock {
        now_ms: Cell<u64>,
    }

    impl FakeClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn advance(&self, ms: u64) {
            self.now_ms.set(self.now_ms.get() + ms);
        }
    }

    impl Clock for FakeClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            self.now_ms.get()
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now_ms.get().saturating_sub(*since))
        }
    }
}
