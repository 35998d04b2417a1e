use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use foundation::time::Time;

/// Source of "now" for timers and gesture velocity.
///
/// Components never read the wall clock themselves; the host passes a clock
/// in, which keeps every timer replayable under [`ManualClock`].
pub trait Clock {
    fn now(&self) -> Time;
}

/// Monotonic wall clock, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Time {
        Time(self.origin.elapsed().as_secs_f64())
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, t: Time) {
        self.now.set(t.0);
    }

    pub fn advance(&self, d: Duration) {
        self.now.set(self.now.get() + d.as_secs_f64());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        Time(self.now.get())
    }
}
