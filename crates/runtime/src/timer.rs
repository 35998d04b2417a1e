//! Explicit, cancellable timers.
//!
//! Timers hold a deadline and are advanced by polling with the current time;
//! nothing fires on its own. Each owner keeps one timer per purpose, and
//! re-arming replaces the previous deadline.

use std::time::Duration;

use foundation::time::Time;

/// One-shot deadline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timer {
    deadline: Option<Time>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer to expire `delay` after `now`.
    pub fn start(&mut self, now: Time, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Returns `true` if the timer was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Time> {
        self.deadline
    }

    /// Armed and not yet expired at `now`.
    pub fn is_running(&self, now: Time) -> bool {
        self.deadline.map(|d| now < d).unwrap_or(false)
    }

    /// Returns `true` exactly once, on the first poll at or past the deadline.
    pub fn fire(&mut self, now: Time) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Trailing-edge debounce: only the last value triggered inside the window
/// comes out, `delay` after the last trigger.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    timer: Timer,
    pending: Option<T>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            timer: Timer::new(),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the window.
    pub fn trigger(&mut self, value: T, now: Time) {
        self.pending = Some(value);
        self.timer.start(now, self.delay);
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    pub fn deadline(&self) -> Option<Time> {
        self.timer.deadline()
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) -> Option<T> {
        self.timer.cancel();
        self.pending.take()
    }

    /// Emits the pending value once its window has elapsed.
    pub fn poll(&mut self, now: Time) -> Option<T> {
        if self.timer.fire(now) {
            return self.pending.take();
        }
        None
    }
}
