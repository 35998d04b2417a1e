//! Axis-locked drag recognizer for scrubbing.
//!
//! A single-pointer drag first travels freely until it leaves a small dead
//! zone, then locks to the dominant axis for the rest of the interaction:
//! - X pans the viewer live and, on release, becomes a step to the
//!   neighbouring item if the drag (extrapolated by its smoothed speed)
//!   covered enough of the viewport width;
//! - Y zooms the viewer out live and, on release, becomes a level change.
//!
//! Velocity is smoothed with a 1-D Kalman filter so a short, fast flick
//! commits just like a long, slow drag.

use foundation::math::{Extent, KalmanFilter, Vec2};
use foundation::time::Time;
use tracing::trace;

use crate::config::GestureConfig;
use crate::intent::NavigationIntent;

/// The map-style view a gesture drives while it is in progress.
///
/// Coordinates are in the view's projection units; `size` is in pointer
/// units.
pub trait Viewer {
    fn center(&self) -> Vec2;
    fn resolution(&self) -> f64;
    /// Rotation in radians.
    fn rotation(&self) -> f64;
    fn size(&self) -> Vec2;
    /// Full extent of the view's projection.
    fn extent(&self) -> Extent;
    fn set_center(&mut self, center: Vec2);
    fn set_resolution(&mut self, resolution: f64);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    None,
    X,
    Y,
}

/// View state captured when the drag starts.
#[derive(Debug, Copy, Clone)]
struct ViewStart {
    center: Vec2,
    resolution: f64,
}

/// State of one pointer interaction, from down to up.
#[derive(Debug, Clone)]
struct Interaction {
    /// Set once more than one pointer took part; such interactions emit
    /// nothing.
    multi: bool,
    axis: Axis,
    /// Pointer position relative to where it went down.
    position: Vec2,
    /// Origin of the displacement; moves to the lock point once locked.
    base: Vec2,
    /// Displacement at the last move sample.
    delta: Vec2,
    last_position: Vec2,
    last_time: Time,
    /// Instantaneous velocity in units per millisecond.
    velocity: Vec2,
    /// Smoothed velocity along the locked axis.
    speed: f64,
    start: Option<ViewStart>,
}

impl Interaction {
    fn new(multi: bool, time: Time) -> Self {
        Self {
            multi,
            axis: Axis::None,
            position: Vec2::ZERO,
            base: Vec2::ZERO,
            delta: Vec2::ZERO,
            last_position: Vec2::ZERO,
            last_time: time,
            velocity: Vec2::ZERO,
            speed: 0.0,
            start: None,
        }
    }
}

/// Turns raw pointer input into [`NavigationIntent`]s.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    filter: KalmanFilter,
    interaction: Option<Interaction>,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        let filter = KalmanFilter::new(config.kalman_q, config.kalman_r);
        Self {
            config,
            filter,
            interaction: None,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Axis of the interaction in progress, if any.
    pub fn axis(&self) -> Option<Axis> {
        self.interaction.as_ref().map(|i| i.axis)
    }

    pub fn is_active(&self) -> bool {
        self.interaction.is_some()
    }

    /// Smoothed speed along the locked axis (units per millisecond).
    pub fn speed(&self) -> f64 {
        self.interaction.as_ref().map(|i| i.speed).unwrap_or(0.0)
    }

    /// Handle a pointer going down; `pointers` is the number now down.
    pub fn on_pointer_down(&mut self, pointers: usize, time: Time) {
        if pointers == 0 {
            return;
        }
        match &mut self.interaction {
            Some(interaction) => interaction.multi |= pointers > 1,
            None => {
                self.filter.reset();
                self.interaction = Some(Interaction::new(pointers > 1, time));
            }
        }
    }

    /// Handle pointer movement.
    ///
    /// - `pointers`: pointers currently down.
    /// - `dx`, `dy`: movement since the previous sample, y growing downward.
    /// - `time`: wall-clock timestamp of the sample.
    pub fn on_pointer_move(
        &mut self,
        pointers: usize,
        dx: f64,
        dy: f64,
        time: Time,
        viewer: &mut dyn Viewer,
    ) {
        let Some(interaction) = self.interaction.as_mut() else {
            return;
        };
        if pointers != 1 {
            interaction.multi = true;
            interaction.axis = Axis::None;
            return;
        }
        if interaction.multi {
            return;
        }

        let start = *interaction.start.get_or_insert_with(|| ViewStart {
            center: viewer.center(),
            resolution: viewer.resolution(),
        });

        interaction.position += Vec2::new(dx, dy);
        let position = interaction.position;
        let mut delta = position - interaction.base;
        interaction.delta = delta;

        let dt_ms = time.since(interaction.last_time).as_secs_f64() * 1000.0;
        if dt_ms > 0.0 {
            interaction.velocity = (position - interaction.last_position).scale(1.0 / dt_ms);
        }

        match interaction.axis {
            Axis::None => {
                let (adx, ady) = (delta.x.abs(), delta.y.abs());
                let threshold = self.config.move_threshold;
                if adx > threshold || ady > threshold {
                    interaction.axis = if adx > ady { Axis::X } else { Axis::Y };
                    interaction.base = position;
                    trace!(axis = ?interaction.axis, "gesture locked");
                }
            }
            Axis::X => {
                delta.y = 0.0;
                interaction.speed = self.filter.filter(interaction.velocity.x, 0.0);
                let world = delta.scale(viewer.resolution()).rotate(viewer.rotation());
                viewer.set_center(start.center - world);
            }
            Axis::Y => {
                interaction.speed = self.filter.filter(interaction.velocity.y, 0.0);
                let resolution =
                    start.resolution * (1.0 + delta.y * self.config.zoom_rate).max(1.0);
                viewer.set_resolution(resolution);

                if !self.config.center_zoom {
                    let extent = viewer.extent();
                    let size = viewer.size();
                    let full_res = (extent.width() / size.x.max(1.0))
                        .max(extent.width() / size.y.max(1.0));
                    let frac = zoom_fraction(start.resolution, resolution, full_res);
                    let x = start.center.x * (1.0 - frac) + extent.center().x * frac;
                    viewer.set_center(Vec2::new(x, start.center.y));
                }
            }
        }

        interaction.last_position = position;
        interaction.last_time = time;
    }

    /// Finish the interaction. Returns at most one intent; nothing for a
    /// multi-pointer interaction or an up without a down.
    pub fn on_pointer_up(&mut self, viewer: &dyn Viewer) -> Option<NavigationIntent> {
        let interaction = self.interaction.take()?;
        if interaction.multi {
            return None;
        }
        let size = viewer.size();
        let intent = match interaction.axis {
            Axis::None => NavigationIntent::Interrupted,
            Axis::X => {
                let committed = interaction.delta.x + interaction.speed * self.config.nav_x_speed;
                let min = size.x * self.config.nav_x_dist;
                if committed.abs() > min {
                    NavigationIntent::Nav {
                        x: -committed,
                        y: 0.0,
                    }
                } else {
                    NavigationIntent::NONE
                }
            }
            Axis::Y => {
                // The vertical flick uses the last raw sample, not the
                // smoothed speed.
                let committed =
                    interaction.delta.y + interaction.velocity.y * self.config.nav_y_speed;
                let min = size.y * self.config.nav_y_dist;
                let y = if committed < -min {
                    1.0
                } else if committed > min {
                    -1.0
                } else {
                    0.0
                };
                NavigationIntent::Nav { x: 0.0, y }
            }
        };
        trace!(?intent, "gesture finished");
        Some(intent)
    }
}

/// How far a zoom-out has progressed from the starting resolution toward the
/// one showing the full extent, in `[0, 1]`.
fn zoom_fraction(start: f64, current: f64, full: f64) -> f64 {
    let span = full - start;
    if span <= 0.0 {
        return if current > start { 1.0 } else { 0.0 };
    }
    ((current - start) / span).clamp(0.0, 1.0)
}
