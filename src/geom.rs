//! Field geometry: points, the screen/field viewport mapping, and transforms.
//!
//! All scene state lives in field-normalized coordinates where `(0, 0)` is the
//! top-left corner of the visible field and `(1, 1)` the bottom-right. Values
//! outside that range are legal; the renderer decides what is visible.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_VIEWPORT_PX, MAX_SCALE, MIN_SCALE};

/// A point in either screen or field space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Maps screen pixels onto the field rectangle drawn on screen.
///
/// `origin_x` / `origin_y` locate the field's top-left corner in pixels and
/// `width` / `height` its drawn size. The field is not zoomable, so there is
/// no pan or zoom state here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { origin_x: 0.0, origin_y: 0.0, width: DEFAULT_VIEWPORT_PX, height: DEFAULT_VIEWPORT_PX }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(origin_x: f64, origin_y: f64, width: f64, height: f64) -> Self {
        Self { origin_x, origin_y, width, height }
    }

    /// A viewport is usable when its origin is finite and both sides are
    /// finite and positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.origin_x.is_finite()
            && self.origin_y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Convert a screen-space point (pixels) to field coordinates.
    #[must_use]
    pub fn screen_to_field(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.origin_x) / self.width,
            y: (screen.y - self.origin_y) / self.height,
        }
    }

    /// Convert a field point to screen coordinates (pixels).
    #[must_use]
    pub fn field_to_screen(&self, field: Point) -> Point {
        Point {
            x: field.x * self.width + self.origin_x,
            y: field.y * self.height + self.origin_y,
        }
    }

    /// Convert a screen-space distance to a field distance.
    ///
    /// Uses the shorter field side so circular hit slop never shrinks below
    /// the requested pixel radius on a non-square field.
    #[must_use]
    pub fn screen_dist_to_field(&self, screen_dist: f64) -> f64 {
        screen_dist / self.width.min(self.height)
    }
}

/// Position, uniform scale, and rotation of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    /// Radians, unbounded.
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, scale: 1.0, rotation: 0.0 }
    }
}

impl Transform {
    #[must_use]
    pub fn at(position: Point) -> Self {
        Self { x: position.x, y: position.y, ..Self::default() }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Map an entity-local point into field space: scale, rotate, translate.
    #[must_use]
    pub fn apply(&self, local: Point) -> Point {
        let (sin, cos) = self.rotation.sin_cos();
        let sx = local.x * self.scale;
        let sy = local.y * self.scale;
        Point { x: self.x + sx * cos - sy * sin, y: self.y + sx * sin + sy * cos }
    }

    /// Map a field point into entity-local space. Inverse of [`Transform::apply`].
    #[must_use]
    pub fn invert(&self, field: Point) -> Point {
        let (sin, cos) = self.rotation.sin_cos();
        let dx = field.x - self.x;
        let dy = field.y - self.y;
        let scale = if self.scale.abs() < f64::EPSILON { 1.0 } else { self.scale };
        Point { x: (dx * cos + dy * sin) / scale, y: (-dx * sin + dy * cos) / scale }
    }
}

/// Inclusive bounds a committed scale must stay within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self { min: MIN_SCALE, max: MAX_SCALE }
    }
}

impl ScaleLimits {
    /// Clamp `scale` into range. Non-finite input collapses to the nearest
    /// bound (`NaN` to `min`) so a bad gesture can never poison the scene.
    #[must_use]
    pub fn clamp(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.min;
        }
        scale.clamp(self.min, self.max)
    }
}

/// Angle in radians of the vector from `center` to `p`.
#[must_use]
pub fn angle_between(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x)
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq < f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * abx, a.y + t * aby))
}
