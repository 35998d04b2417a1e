use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use streaming::window::DEFAULT_WINDOW_SIZE;

/// Tuning for [`crate::gesture::GestureRecognizer`].
///
/// Distances are in pointer units (CSS pixels), speeds in units per
/// millisecond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Travel needed before the gesture commits to an axis.
    pub move_threshold: f64,
    /// How far (ms) the release speed is extrapolated on X.
    pub nav_x_speed: f64,
    /// Fraction of the viewer width a horizontal gesture must cover.
    pub nav_x_dist: f64,
    /// How far (ms) the release speed is extrapolated on Y.
    pub nav_y_speed: f64,
    /// Fraction of the viewer height a vertical gesture must cover.
    pub nav_y_dist: f64,
    /// Resolution growth per unit of vertical drag.
    pub zoom_rate: f64,
    /// Keep the view center fixed while zooming out vertically.
    pub center_zoom: bool,
    pub kalman_q: f64,
    pub kalman_r: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            move_threshold: 5.0,
            nav_x_speed: 1000.0,
            nav_x_dist: 0.5,
            nav_y_speed: 1000.0,
            nav_y_dist: 0.05,
            zoom_rate: 0.01,
            center_zoom: false,
            kalman_q: 3.0,
            kalman_r: 0.01,
        }
    }
}

/// When a navigation is pushed to the authoritative source (the router).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Every accepted navigation is committed right away.
    Immediate,
    /// Only the last navigation in a burst is committed, `delay_ms` after it.
    Debounced { delay_ms: u64 },
}

impl CommitPolicy {
    pub fn delay(&self) -> Option<Duration> {
        match self {
            CommitPolicy::Immediate => None,
            CommitPolicy::Debounced { delay_ms } => Some(Duration::from_millis(*delay_ms)),
        }
    }
}

impl Default for CommitPolicy {
    fn default() -> Self {
        CommitPolicy::Debounced { delay_ms: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Items per cached window.
    pub window_size: u64,
    /// Minimum time `is_seeking` stays up after a navigation.
    pub seeking_min_ms: u64,
    /// Quiet time on the active index before the full record is fetched.
    pub upgrade_debounce_ms: u64,
    pub commit: CommitPolicy,
    pub gesture: GestureConfig,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            seeking_min_ms: 200,
            upgrade_debounce_ms: 200,
            commit: CommitPolicy::default(),
            gesture: GestureConfig::default(),
        }
    }
}

impl NavigationConfig {
    pub fn seeking_min(&self) -> Duration {
        Duration::from_millis(self.seeking_min_ms)
    }

    pub fn upgrade_debounce(&self) -> Duration {
        Duration::from_millis(self.upgrade_debounce_ms)
    }

    /// Defaults with `SCRUB_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Unparseable values keep the current
    /// setting.
    ///
    /// `SCRUB_COMMIT_DEBOUNCE_MS=0` selects [`CommitPolicy::Immediate`].
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.window_size = env_or(&lookup, "SCRUB_WINDOW_SIZE", self.window_size).max(1);
        self.seeking_min_ms = env_or(&lookup, "SCRUB_SEEKING_MIN_MS", self.seeking_min_ms);
        self.upgrade_debounce_ms =
            env_or(&lookup, "SCRUB_UPGRADE_DEBOUNCE_MS", self.upgrade_debounce_ms);

        let current_delay = self.commit.delay().map(|d| d.as_millis() as u64).unwrap_or(0);
        self.commit = match env_or(&lookup, "SCRUB_COMMIT_DEBOUNCE_MS", current_delay) {
            0 => CommitPolicy::Immediate,
            delay_ms => CommitPolicy::Debounced { delay_ms },
        };

        let g = &mut self.gesture;
        g.move_threshold = env_or(&lookup, "SCRUB_MOVE_THRESHOLD", g.move_threshold);
        g.nav_x_dist = env_or(&lookup, "SCRUB_NAV_X_DIST", g.nav_x_dist);
        g.nav_y_dist = env_or(&lookup, "SCRUB_NAV_Y_DIST", g.nav_y_dist);
        g.center_zoom = env_or(&lookup, "SCRUB_CENTER_ZOOM", g.center_zoom);
        self
    }
}

fn env_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
