//! Gate geometry and the directional crossing test.

use serde::{Deserialize, Serialize};

/// A point in frame pixel coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A gate line defined by two fixed endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl LineSegment {
    pub fn new((x1, y1): (f32, f32), (x2, y2): (f32, f32)) -> Self {
        Self::from_points(Point::new(x1, y1), Point::new(x2, y2))
    }

    pub fn from_points(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Both endpoints share a y-coordinate.
    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// The gate's y-coordinate, if the line is horizontal.
    pub fn gate_y(&self) -> Option<f32> {
        self.is_horizontal().then_some(self.start.y)
    }
}

/// Returns true iff the point moved from strictly above a horizontal `line`
/// to at-or-below it between `previous` and `current`.
///
/// Only the y-coordinate is compared; the horizontal extent of the segment is
/// not consulted. Non-horizontal lines never report a crossing.
pub fn has_crossed(previous: Point, current: Point, line: &LineSegment) -> bool {
    match line.gate_y() {
        Some(y) => previous.y < y && current.y >= y,
        None => false,
    }
}
