//! Spherical Web Mercator (EPSG:3857).
//!
//! Projected coordinates are meters on a sphere of radius [`SPHERE_RADIUS`];
//! the square full extent spans `±MERCATOR_HALF_EXTENT` on both axes.

use super::Vec2;

/// WGS84 semi-major axis (meters), used as the sphere radius.
pub const SPHERE_RADIUS: f64 = 6_378_137.0;

/// Half width of the projected world: `π · R`.
pub const MERCATOR_HALF_EXTENT: f64 = std::f64::consts::PI * SPHERE_RADIUS;

/// Latitudes beyond this project outside the square extent.
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_59;

/// `[min_x, min_y, max_x, max_y]` in projected meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Extent {
    pub min: Vec2,
    pub max: Vec2,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        self.min.lerp(self.max, 0.5)
    }
}

pub fn mercator_extent() -> Extent {
    Extent {
        min: Vec2::new(-MERCATOR_HALF_EXTENT, -MERCATOR_HALF_EXTENT),
        max: Vec2::new(MERCATOR_HALF_EXTENT, MERCATOR_HALF_EXTENT),
    }
}

/// Longitude/latitude in degrees to projected meters.
///
/// Latitude is clamped so the result stays inside [`mercator_extent`].
pub fn lon_lat_to_mercator(lon_deg: f64, lat_deg: f64) -> Vec2 {
    let lat = lat_deg.clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG);
    let x = SPHERE_RADIUS * lon_deg.to_radians();
    let y = SPHERE_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() * 0.5).tan().ln();
    Vec2::new(x, y.clamp(-MERCATOR_HALF_EXTENT, MERCATOR_HALF_EXTENT))
}

/// Projected meters to `(lon_deg, lat_deg)`.
pub fn mercator_to_lon_lat(p: Vec2) -> (f64, f64) {
    let lon = (p.x / SPHERE_RADIUS).to_degrees();
    let lat = (2.0 * (p.y / SPHERE_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}
