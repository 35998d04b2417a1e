use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in scene units.
///
/// Scene space has its origin at the top-left corner and Y growing downward.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    /// True when both sides are finite and strictly positive.
    pub fn has_area(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;

    #[test]
    fn area_requires_positive_finite_sides() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).has_area());
        assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).has_area());
        assert!(!Rect::new(0.0, 0.0, f64::NAN, 1.0).has_area());
        assert!(!Rect::new(0.0, 0.0, 1.0, -2.0).has_area());
    }

    #[test]
    fn bounds_decode_from_wire_shape() {
        let r: Rect = serde_json::from_str(r#"{"x":1,"y":2,"w":3,"h":4}"#).unwrap();
        assert_eq!(r, Rect::new(1.0, 2.0, 3.0, 4.0));
    }
}
