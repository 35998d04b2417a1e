use std::time::Duration;

/// Time primitives
///
/// Seconds on an arbitrary monotonic origin. Callers supply the values, so
/// anything built on `Time` stays replayable in tests.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_millis(ms: f64) -> Self {
        Time(ms / 1000.0)
    }

    pub fn as_millis(self) -> f64 {
        self.0 * 1000.0
    }

    /// Elapsed time since `earlier`, clamped at zero.
    pub fn since(self, earlier: Time) -> Duration {
        Duration::from_secs_f64((self.0 - earlier.0).max(0.0))
    }

    pub fn after(self, d: Duration) -> Time {
        Time(self.0 + d.as_secs_f64())
    }
}

impl std::ops::Add<Duration> for Time {
    type Output = Time;

    fn add(self, d: Duration) -> Time {
        self.after(d)
    }
}
