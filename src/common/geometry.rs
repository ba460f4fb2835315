use serde::{Deserialize, Serialize};

/// A point in a 2D coordinate space (texture or output).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const ZERO: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Linear interpolation; `t` is not clamped.
    pub fn lerp(&self, other: &Point2, t: f32) -> Point2 {
        Point2 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// World-space position of an actor. Depth (`z`) belongs to the actor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_point(point: Point2, z: f32) -> Self {
        Self::new(point.x, point.y, z)
    }

    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    pub fn lerp(&self, other: &Position3, t: f32) -> Position3 {
        Position3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// The on-screen rectangle of the video feed, as four corners in the
/// destination space. The destination origin is bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputQuad {
    pub bottom_left: Point2,
    pub top_left: Point2,
    pub top_right: Point2,
    pub bottom_right: Point2,
}

impl OutputQuad {
    /// Axis-aligned rectangle spanning `min` (bottom-left) to `max` (top-right).
    pub fn from_rect(min: Point2, max: Point2) -> Self {
        Self {
            bottom_left: min,
            top_left: Point2::new(min.x, max.y),
            top_right: max,
            bottom_right: Point2::new(max.x, min.y),
        }
    }
}

/// World-space rectangle an actor must stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    pub min: Point2,
    pub max: Point2,
}

impl Bounds2 {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Shrinks every side by `inset`. An inset larger than half the extent
    /// collapses that axis onto its center.
    pub fn inset(&self, inset_x: f32, inset_y: f32) -> Bounds2 {
        let shrink = |lo: f32, hi: f32, by: f32| {
            if hi - lo <= 2.0 * by {
                let mid = (lo + hi) * 0.5;
                (mid, mid)
            } else {
                (lo + by, hi - by)
            }
        };
        let (min_x, max_x) = shrink(self.min.x, self.max.x, inset_x);
        let (min_y, max_y) = shrink(self.min.y, self.max.y, inset_y);
        Bounds2::new(Point2::new(min_x, min_y), Point2::new(max_x, max_y))
    }

    pub fn clamp(&self, point: Point2) -> Point2 {
        Point2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_quad_corners() {
        let quad = OutputQuad::from_rect(Point2::new(-4.0, -3.0), Point2::new(4.0, 3.0));
        assert_eq!(quad.top_left, Point2::new(-4.0, 3.0));
        assert_eq!(quad.bottom_right, Point2::new(4.0, -3.0));
    }

    #[test]
    fn inset_collapses_when_too_large() {
        let bounds = Bounds2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 2.0));
        let inner = bounds.inset(1.0, 1.5);
        assert_eq!(inner.min, Point2::new(1.0, 1.0));
        assert_eq!(inner.max, Point2::new(9.0, 1.0));
        assert_eq!(inner.clamp(Point2::new(20.0, -5.0)), Point2::new(9.0, 1.0));
    }

    #[test]
    fn lerp_and_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.lerp(&b, 0.5), Point2::new(1.5, 2.0));
    }
}
