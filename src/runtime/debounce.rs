//! Trailing-edge debounce for surface refits.
//!
//! Callers pass the current instant in so the deadline logic stays testable; the event loop
//! polls with `next_timeout_ms` the same way it polls stdin.

use std::time::{Duration, Instant};

pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a resize; pushes the pending refit out by a full delay.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Milliseconds until the pending refit is due, `None` when nothing is pending.
    pub fn next_timeout_ms(&self, now: Instant) -> Option<u64> {
        let deadline = self.deadline?;
        let remaining = deadline.saturating_duration_since(now);
        Some(remaining.as_millis().min(u128::from(u64::MAX)) as u64)
    }

    /// Returns true exactly once per burst, when the quiet period has elapsed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE)
    }
}
