/// One-dimensional Kalman filter over a scalar signal.
///
/// Model: `x' = A·x + B·u`, measurement `z = C·x`. With the defaults
/// (`A = 1`, `B = 0`, `C = 1`) it smooths a noisy, roughly constant value
/// such as pointer velocity.
///
/// `r` is added to the covariance on every prediction step and `q` weighs
/// each incoming measurement in the gain, so a large `q` relative to `r`
/// yields heavy smoothing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KalmanFilter {
    q: f64,
    r: f64,
    a: f64,
    b: f64,
    c: f64,
    /// Current estimate; `None` until the first measurement.
    x: Option<f64>,
    cov: f64,
}

impl KalmanFilter {
    pub fn new(q: f64, r: f64) -> Self {
        Self {
            q,
            r,
            a: 1.0,
            b: 0.0,
            c: 1.0,
            x: None,
            cov: f64::NAN,
        }
    }

    /// Forget all history; the next measurement seeds the estimate.
    pub fn reset(&mut self) {
        self.x = None;
        self.cov = f64::NAN;
    }

    pub fn estimate(&self) -> Option<f64> {
        self.x
    }

    pub fn covariance(&self) -> f64 {
        self.cov
    }

    /// Fold one measurement `z` (with control input `u`) into the estimate.
    pub fn filter(&mut self, z: f64, u: f64) -> f64 {
        let Some(x) = self.x else {
            let x = z / self.c;
            self.x = Some(x);
            self.cov = self.q / (self.c * self.c);
            return x;
        };

        let predicted = self.a * x + self.b * u;
        let predicted_cov = self.a * self.cov * self.a + self.r;

        let gain = predicted_cov * self.c / (self.c * predicted_cov * self.c + self.q);
        let next = predicted + gain * (z - self.c * predicted);
        self.cov = predicted_cov - gain * self.c * predicted_cov;
        self.x = Some(next);
        next
    }
}
