//! Line segment between two points.

use super::Vector2;

/// A segment from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vector2,
    pub end: Vector2,
}

impl Segment {
    #[inline]
    pub fn new(start: Vector2, end: Vector2) -> Self {
        Self { start, end }
    }

    /// Length of the segment.
    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Closest point on the segment to `point`.
    ///
    /// Degenerate segments collapse to their start point.
    pub fn closest_point(&self, point: Vector2) -> Vector2 {
        let dir = self.end - self.start;
        let len_sq = dir.magnitude_sq();
        if len_sq == 0.0 {
            return self.start;
        }
        let t = ((point - self.start).dot(dir) / len_sq).clamp(0.0, 1.0);
        self.start + dir * t
    }

    /// Distance from `point` to the segment.
    #[inline]
    pub fn distance_to(&self, point: Vector2) -> f64 {
        self.closest_point(point).distance(point)
    }
}
