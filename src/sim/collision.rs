//! Collision predicates for circles and axis-aligned rectangles
//!
//! Everything here is pure: shells are circles, tank bodies, obstacles and
//! crates are rectangles in center + half-extent form.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Gap left between a clamped body and the playfield edge, so the clamped
/// position still passes the strict `within_bounds` test
pub const EDGE_SKIN: f32 = 0.5;

/// Playfield extent; the playable area is [0, width] × [0, height]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldBounds {
    pub width: f32,
    pub height: f32,
}

impl PlayfieldBounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True if the point lies on or inside the playfield
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Nearest center that keeps `rect` strictly inside the playfield
    pub fn clamp_inside(&self, rect: &Rect) -> Vec2 {
        let lo = rect.half + EDGE_SKIN;
        let hi = Vec2::new(self.width, self.height) - lo;
        rect.center.clamp(lo, hi.max(lo))
    }
}

impl Default for PlayfieldBounds {
    fn default() -> Self {
        Self::new(crate::consts::PLAYFIELD_WIDTH, crate::consts::PLAYFIELD_HEIGHT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Axis-aligned rectangle in center + half-extent form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub half: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    /// Build from a top-left corner and a size (level data convention)
    pub fn from_corner(min: Vec2, size: Vec2) -> Self {
        Self::new(min + size * 0.5, size)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Closest point of the rectangle to `point`
    #[inline]
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }
}

/// True iff the distance between centers is strictly less than the radii sum
#[inline]
pub fn circles_collide(a: &Circle, b: &Circle) -> bool {
    a.center.distance_squared(b.center) < (a.radius + b.radius).powi(2)
}

/// Clamped-distance test: the rect's closest point to the circle center is
/// within the radius (touching counts)
#[inline]
pub fn circle_rect_collide(circle: &Circle, rect: &Rect) -> bool {
    let closest = rect.clamp_point(circle.center);
    closest.distance_squared(circle.center) <= circle.radius * circle.radius
}

/// AABB overlap; rectangles that merely share an edge do not collide
#[inline]
pub fn rects_collide(a: &Rect, b: &Rect) -> bool {
    let gap = (a.center - b.center).abs();
    let reach = a.half + b.half;
    gap.x < reach.x && gap.y < reach.y
}

/// True iff the rect lies strictly inside the playfield
#[inline]
pub fn within_bounds(rect: &Rect, bounds: PlayfieldBounds) -> bool {
    let min = rect.min();
    let max = rect.max();
    min.x > 0.0 && min.y > 0.0 && max.x < bounds.width && max.y < bounds.height
}
