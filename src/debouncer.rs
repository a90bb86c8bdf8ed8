use std::time::{Duration, Instant};

/// Default delay before a burst of keystrokes is committed
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// A single pending-timer handle.
///
/// Each `trigger` restarts the timer, superseding any earlier deadline.
/// Nothing fires on its own: the owner polls `should_execute` from its
/// event loop, so cancellation is just `reset`. Every time-dependent
/// method has an `_at` twin taking an explicit `Instant` for tests.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// The duration to wait after the last event before triggering
    delay: Duration,
    /// When the last event occurred
    last_event: Option<Instant>,
}

impl Debouncer {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self::with_delay(Duration::from_millis(delay_ms))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            last_event: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register that an event occurred
    pub fn trigger(&mut self) {
        self.trigger_at(Instant::now());
    }

    pub fn trigger_at(&mut self, now: Instant) {
        self.last_event = Some(now);
    }

    /// Check if enough time has passed to execute the debounced action.
    /// Returns true at most once per burst.
    pub fn should_execute(&mut self) -> bool {
        self.should_execute_at(Instant::now())
    }

    pub fn should_execute_at(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(last) if now.saturating_duration_since(last) >= self.delay => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before the action triggers; None if nothing is pending
    pub fn time_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.last_event
            .map(|last| self.delay.saturating_sub(now.saturating_duration_since(last)))
    }

    /// Reset the debouncer, canceling any pending action
    pub fn reset(&mut self) {
        self.last_event = None;
    }

    /// Check if there's a pending action
    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(1000);

        debouncer.trigger_at(start);
        assert!(!debouncer.should_execute_at(start + Duration::from_millis(999)));
        assert!(debouncer.should_execute_at(start + Duration::from_millis(1000)));
        assert!(!debouncer.should_execute_at(start + Duration::from_millis(5000)));
    }

    #[test]
    fn test_retrigger_restarts_timer() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(1000);

        debouncer.trigger_at(start);
        debouncer.trigger_at(start + Duration::from_millis(800));
        assert!(!debouncer.should_execute_at(start + Duration::from_millis(1500)));
        assert_eq!(
            debouncer.time_remaining_at(start + Duration::from_millis(1500)),
            Some(Duration::from_millis(300))
        );
        assert!(debouncer.should_execute_at(start + Duration::from_millis(1800)));
    }

    #[test]
    fn test_reset_cancels() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(3000);

        debouncer.trigger_at(start);
        assert!(debouncer.is_pending());
        debouncer.reset();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.time_remaining_at(start), None);
        assert!(!debouncer.should_execute_at(start + Duration::from_secs(10)));
    }
}
