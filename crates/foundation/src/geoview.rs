//! Geographic view ⇄ scene rectangle transform.
//!
//! A map-style viewer describes what it shows as `[lon, lat, zoom]`, the scene
//! viewer as a rectangle in scene units. Both describe the same position once
//! the scene is laid over the Web Mercator extent, stretched independently on
//! each axis to fill it.
//!
//! Everything here is pure. Missing or degenerate inputs yield `None`.

use serde::{Deserialize, Serialize};

use crate::bounds::Rect;
use crate::math::{Extent, Vec2, lon_lat_to_mercator, mercator_extent, mercator_to_lon_lat};

const LON_LAT_EPSILON: f64 = 1e-4;
const ZOOM_EPSILON: f64 = 1e-1;

/// `[longitude, latitude, zoom]` as used by map URLs.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct ViewDescriptor {
    pub lon: f64,
    pub lat: f64,
    pub zoom: f64,
}

impl ViewDescriptor {
    pub fn new(lon: f64, lat: f64, zoom: f64) -> Self {
        Self { lon, lat, zoom }
    }

    fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite() && self.zoom.is_finite()
    }
}

impl From<[f64; 3]> for ViewDescriptor {
    fn from([lon, lat, zoom]: [f64; 3]) -> Self {
        Self { lon, lat, zoom }
    }
}

impl From<ViewDescriptor> for [f64; 3] {
    fn from(v: ViewDescriptor) -> Self {
        [v.lon, v.lat, v.zoom]
    }
}

/// Scene units per projected meter, per axis.
fn scene_scale(full: &Extent, scene: &Rect) -> Vec2 {
    Vec2::new(scene.w / full.width(), scene.h / full.height())
}

/// Geographic view to the scene rectangle it covers.
pub fn to_view(view: Option<ViewDescriptor>, scene_bounds: Option<Rect>) -> Option<Rect> {
    let view = view?;
    let scene = scene_bounds?;
    if !view.is_finite() || !scene.has_area() {
        return None;
    }

    let full = mercator_extent();
    let scale = scene_scale(&full, &scene);
    let center = lon_lat_to_mercator(view.lon, view.lat);

    let power = view.zoom.exp2();
    let span = Vec2::new(full.width() / power, full.height() / power);
    let min = center - span;
    let max = center + span;

    Some(Rect {
        x: (min.x - full.min.x) * scale.x,
        // Scene Y grows downward, projected Y grows upward.
        y: (full.max.y - max.y) * scale.y,
        w: (max.x - min.x) * scale.x,
        h: (max.y - min.y) * scale.y,
    })
}

/// Scene rectangle to the smallest geographic view that contains it.
pub fn from_view(rect: Option<Rect>, scene_bounds: Option<Rect>) -> Option<ViewDescriptor> {
    let rect = rect?;
    let scene = scene_bounds?;
    if !rect.has_area() || !scene.has_area() || !rect.x.is_finite() || !rect.y.is_finite() {
        return None;
    }

    let full = mercator_extent();
    let scale = scene_scale(&full, &scene);

    let left = rect.x / scale.x + full.min.x;
    let top = full.max.y - rect.y / scale.y;
    let right = (rect.x + rect.w) / scale.x + full.min.x;
    let bottom = full.max.y - (rect.y + rect.h) / scale.y;

    let center = Vec2::new((left + right) * 0.5, (top + bottom) * 0.5);
    let half_w = (right - left) * 0.5;
    let half_h = (top - bottom) * 0.5;

    let power = (full.width() / half_w).max(full.height() / half_h);
    let (lon, lat) = mercator_to_lon_lat(center);
    Some(ViewDescriptor::new(lon, lat, power.log2()))
}

/// Loose equality used to break feedback loops between the two viewers.
pub fn equal(a: Option<ViewDescriptor>, b: Option<ViewDescriptor>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };
    (a.lon - b.lon).abs() < LON_LAT_EPSILON
        && (a.lat - b.lat).abs() < LON_LAT_EPSILON
        && (a.zoom - b.zoom).abs() < ZOOM_EPSILON
}
