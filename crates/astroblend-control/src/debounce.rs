//! Coalescing rapid parameter changes into single pipeline runs.
//!
//! Dragging a slider produces a burst of change events, and a pipeline
//! run is far too expensive to start for each one. The [`Debouncer`]
//! holds a single re-armable deadline: every [`notify`] cancels the
//! previous deadline and starts a new quiescence window, so at most
//! one execution is ever pending, and it fires only once input has
//! been idle for the full window.
//!
//! The debouncer only times. The caller reads the parameter snapshot
//! when [`poll`] fires, which is how the *last* state before
//! quiescence — not the first — is the one processed. Superseded
//! states are never queued.
//!
//! This is a cooperative, single-threaded scheduler: nothing fires
//! between [`poll`] calls, and pipeline execution blocking the thread
//! also blocks re-arming, which is exactly the serialization the
//! stateful engine needs.
//!
//! [`notify`]: Debouncer::notify
//! [`poll`]: Debouncer::poll

use std::time::Duration;

use crate::clock::Clock;

/// Idle time required after the last parameter change before the
/// pipeline runs.
pub const QUIESCENCE_WINDOW: Duration = Duration::from_millis(700);

/// A single re-armable quiescence deadline.
#[derive(Debug)]
pub struct Debouncer<C: Clock> {
    window: Duration,
    armed_at: Option<C::Instant>,
}

impl<C: Clock> Debouncer<C> {
    /// A debouncer with the standard 700 ms quiescence window.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_window(QUIESCENCE_WINDOW)
    }

    /// A debouncer with a custom quiescence window.
    #[must_use]
    pub const fn with_window(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    /// Arm, or re-arm, the deadline.
    ///
    /// Any previously pending deadline is cancelled; the window starts
    /// over from now.
    pub fn notify(&mut self, clock: &C) {
        if self.armed_at.is_some() {
            log::trace!("debounce re-armed, previous deadline cancelled");
        }
        self.armed_at = Some(clock.now());
    }

    /// Fire if the quiescence window has elapsed.
    ///
    /// Returns `true` at most once per armed window; firing disarms
    /// the deadline until the next [`notify`](Self::notify).
    pub fn poll(&mut self, clock: &C) -> bool {
        match self.armed_at {
            Some(armed_at) if clock.elapsed(&armed_at) >= self.window => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending deadline without firing.
    pub fn cancel(&mut self) {
        self.armed_at = None;
    }

    /// Whether a deadline is currently pending.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }
}

impl<C: Clock> Default for Debouncer<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::fake::FakeClock;

    #[test]
    fn does_not_fire_before_the_window() {
        let clock = FakeClock::new();
        let mut debouncer = Debouncer::new();

        debouncer.notify(&clock);
        clock.advance(699);
        assert!(!debouncer.poll(&clock));
        assert!(debouncer.is_armed());
    }

    #[test]
    fn fires_once_after_quiescence() {
        let clock = FakeClock::new();
        let mut debouncer = Debouncer::new();

        debouncer.notify(&clock);
        clock.advance(700);
        assert!(debouncer.poll(&clock));
        // Disarmed after firing: no second execution.
        assert!(!debouncer.poll(&clock));
        clock.advance(10_000);
        assert!(!debouncer.poll(&clock));
    }

    #[test]
    fn rapid_notifies_coalesce_into_one_fire() {
        let clock = FakeClock::new();
        let mut debouncer = Debouncer::new();

        // Five notifications, each 100 ms apart — all within the
        // window of their predecessor.
        for _ in 0..5 {
            debouncer.notify(&clock);
            clock.advance(100);
            assert!(!debouncer.poll(&clock));
        }

        // 600 ms after the last notify: still quiet.
        clock.advance(500);
        assert!(!debouncer.poll(&clock));

        // 700 ms after the last notify: exactly one fire.
        clock.advance(100);
        assert!(debouncer.poll(&clock));
        assert!(!debouncer.poll(&clock));
    }

    #[test]
    fn cancel_discards_the_pending_deadline() {
        let clock = FakeClock::new();
        let mut debouncer = Debouncer::new();

        debouncer.notify(&clock);
        debouncer.cancel();
        clock.advance(5_000);
        assert!(!debouncer.poll(&clock));
    }

    #[test]
    fn custom_window_is_respected() {
        let clock = FakeClock::new();
        let mut debouncer = Debouncer::with_window(Duration::from_millis(50));

        debouncer.notify(&clock);
        clock.advance(49);
        assert!(!debouncer.poll(&clock));
        clock.advance(1);
        assert!(debouncer.poll(&clock));
    }
}
