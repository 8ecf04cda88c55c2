//! Pan/zoom transform shared by hit-testing, the frame output and the painter.
//!
//! Screen = world * scale + translate. The transform belongs to the engine,
//! not the session, so it survives graph replacement.

use serde::{Deserialize, Serialize};

use crate::graph::Point;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { scale: 1.0, translate_x: 0.0, translate_y: 0.0 };

    /// Replace unusable components with identity values.
    pub fn sanitized(self) -> Self {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Self {
            scale: if self.scale.is_finite() && self.scale > 0.0 { self.scale } else { 1.0 },
            translate_x: finite_or(self.translate_x, 0.0),
            translate_y: finite_or(self.translate_y, 0.0),
        }
    }

    /// World -> screen.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.translate_x, p.y * self.scale + self.translate_y)
    }

    /// Screen -> world.
    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.translate_x) / self.scale, (p.y - self.translate_y) / self.scale)
    }

    /// Scale by `factor` keeping the world point under `screen` fixed.
    pub fn zoom_at(&self, screen: Point, factor: f64, min_scale: f64, max_scale: f64) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return *self;
        }
        let scale = (self.scale * factor).clamp(min_scale, max_scale);
        let world = self.invert(screen);
        Self { scale, translate_x: screen.x - world.x * scale, translate_y: screen.y - world.y * scale }
    }

    pub fn pan(&self, dx: f64, dy: f64) -> Self {
        Self { translate_x: self.translate_x + dx, translate_y: self.translate_y + dy, ..*self }
    }
}

/// Whether wheel input zooms. Host-controlled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoomMode {
    #[default]
    Interactive,
    Fixed,
}

/// Multiplicative zoom for a wheel delta; scrolling up zooms in.
pub fn wheel_factor(delta_y: f64, sensitivity: f64) -> f64 {
    let f = (-delta_y * sensitivity).exp();
    if f.is_finite() { f } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_invert() {
        let t = Transform { scale: 2.0, translate_x: 10.0, translate_y: -4.0 };
        let p = Point::new(3.0, 5.0);
        assert_eq!(t.apply(p), Point::new(16.0, 6.0));
        assert_eq!(t.invert(t.apply(p)), p);
    }

    #[test]
    fn test_zoom_keeps_point_under_cursor() {
        let t = Transform { scale: 1.0, translate_x: 20.0, translate_y: 30.0 };
        let cursor = Point::new(100.0, 80.0);
        let before = t.invert(cursor);

        let z = t.zoom_at(cursor, 2.0, 0.1, 8.0);
        assert_eq!(z.scale, 2.0);
        let after = z.invert(cursor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamped() {
        let t = Transform::IDENTITY;
        assert_eq!(t.zoom_at(Point::ZERO, 100.0, 0.1, 8.0).scale, 8.0);
        assert_eq!(t.zoom_at(Point::ZERO, 0.001, 0.1, 8.0).scale, 0.1);
        assert_eq!(t.zoom_at(Point::ZERO, f64::NAN, 0.1, 8.0), t);
    }

    #[test]
    fn test_pan() {
        let t = Transform::IDENTITY.pan(5.0, -2.0).pan(1.0, 1.0);
        assert_eq!(t, Transform { scale: 1.0, translate_x: 6.0, translate_y: -1.0 });
    }

    #[test]
    fn test_sanitized() {
        let t = Transform { scale: 0.0, translate_x: f64::INFINITY, translate_y: 3.0 }.sanitized();
        assert_eq!(t, Transform { scale: 1.0, translate_x: 0.0, translate_y: 3.0 });
    }

    #[test]
    fn test_wheel_factor_direction() {
        assert!(wheel_factor(-100.0, 0.002) > 1.0);
        assert!(wheel_factor(100.0, 0.002) < 1.0);
        assert_eq!(wheel_factor(0.0, 0.002), 1.0);
    }

    #[test]
    fn test_zoom_mode_json() {
        assert_eq!(serde_json::to_string(&ZoomMode::Fixed).unwrap(), "\"fixed\"");
        let t: Transform = serde_json::from_str(r#"{"scale":2}"#).unwrap();
        assert_eq!(t, Transform { scale: 2.0, translate_x: 0.0, translate_y: 0.0 });
    }
}
