//! Column search debouncing.
//!
//! Keystrokes update a pending mapping synchronously; the mapping is only
//! committed once the delay has elapsed with no further change. At most
//! one commit fires per quiet period and it always carries the latest
//! pending mapping.

use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::debouncer::Debouncer;
use crate::table::query_state::ColumnSearch;

/// Pending per-column search text plus its timer
#[derive(Debug, Clone)]
pub struct PendingColumnSearch {
    pending: ColumnSearch,
    debouncer: Debouncer,
}

impl PendingColumnSearch {
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: ColumnSearch::new(),
            debouncer: Debouncer::with_delay(delay),
        }
    }

    pub fn delay(&self) -> Duration {
        self.debouncer.delay()
    }

    /// The mapping as currently typed, not yet committed
    pub fn pending(&self) -> &ColumnSearch {
        &self.pending
    }

    pub fn update(&mut self, column: &str, text: &str) {
        self.update_at(column, text, Instant::now());
    }

    /// Merge one column's text and restart the timer
    pub fn update_at(&mut self, column: &str, text: &str, now: Instant) {
        self.pending.set(column, text);
        self.debouncer.trigger_at(now);
        trace!(target: "debounce", "column '{}' -> '{}', timer restarted", column, text);
    }

    pub fn is_scheduled(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn time_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_remaining_at(now)
    }

    /// The snapshot to commit, if the quiet period has elapsed
    pub fn take_ready_at(&mut self, now: Instant) -> Option<ColumnSearch> {
        if self.debouncer.should_execute_at(now) {
            debug!(target: "debounce", "committing {} column filter(s)", self.pending.len());
            Some(self.pending.normalized())
        } else {
            None
        }
    }

    /// Commit now regardless of the timer, if anything is scheduled
    pub fn flush(&mut self) -> Option<ColumnSearch> {
        if self.debouncer.is_pending() {
            self.debouncer.reset();
            Some(self.pending.normalized())
        } else {
            None
        }
    }

    /// Drop the scheduled commit; the pending text is kept
    pub fn cancel(&mut self) {
        if self.debouncer.is_pending() {
            debug!(target: "debounce", "pending column search cancelled");
        }
        self.debouncer.reset();
    }
}

/// A `PendingColumnSearch` bound to a commit callback.
///
/// Dropping it cancels any scheduled commit, so the callback can never
/// run after its owner is torn down.
pub struct ColumnSearchDebouncer<F>
where
    F: FnMut(ColumnSearch),
{
    inner: PendingColumnSearch,
    on_commit: F,
}

impl<F> ColumnSearchDebouncer<F>
where
    F: FnMut(ColumnSearch),
{
    pub fn new(delay: Duration, on_commit: F) -> Self {
        Self {
            inner: PendingColumnSearch::new(delay),
            on_commit,
        }
    }

    pub fn pending(&self) -> &ColumnSearch {
        self.inner.pending()
    }

    pub fn is_scheduled(&self) -> bool {
        self.inner.is_scheduled()
    }

    pub fn update(&mut self, column: &str, text: &str) {
        self.inner.update(column, text);
    }

    pub fn update_at(&mut self, column: &str, text: &str, now: Instant) {
        self.inner.update_at(column, text, now);
    }

    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Invoke the callback if the quiet period has elapsed.
    /// Returns whether a commit fired.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.inner.take_ready_at(now) {
            Some(snapshot) => {
                (self.on_commit)(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn flush(&mut self) -> bool {
        match self.inner.flush() {
            Some(snapshot) => {
                (self.on_commit)(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) {
        self.inner.cancel();
    }
}

impl<F> Drop for ColumnSearchDebouncer<F>
where
    F: FnMut(ColumnSearch),
{
    fn drop(&mut self) {
        self.inner.cancel();
    }
}
