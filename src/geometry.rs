//! Core geometry types shared by every coordinate space.
//!
//! The same [`Point`] is used for page, stage, image-pixel and percentage
//! coordinates. Functions taking a `Point` say which space they expect.

use std::ops::{Add, AddAssign, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point (or vector) in one of the four coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Width (`x`) and height (`y`) of an image, canvas or container.
pub type Size = Point;

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Shortest distance from this point to the segment `a`-`b`.
    pub fn distance_to_segment(&self, a: &Point, b: &Point) -> f64 {
        let ab = *b - *a;
        let len_sq = ab.x * ab.x + ab.y * ab.y;
        if len_sq == 0.0 {
            return self.distance_to(a);
        }
        let t = (((self.x - a.x) * ab.x + (self.y - a.y) * ab.y) / len_sq).clamp(0.0, 1.0);
        self.distance_to(&(*a + ab * t))
    }

    /// Componentwise product.
    pub fn scale_by(self, other: Point) -> Point {
        Point::new(self.x * other.x, self.y * other.y)
    }

    /// Whether either component is zero.
    pub fn has_zero_dimension(&self) -> bool {
        self.x == 0.0 || self.y == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// Expand two opposite corners into the four-corner rendering order
/// `{start, (start.x, end.y), end, (end.x, start.y)}`.
pub fn bbox_corners(start: Point, end: Point) -> [Point; 4] {
    [
        start,
        Point::new(start.x, end.y),
        end,
        Point::new(end.x, start.y),
    ]
}

/// Top-left and bottom-right corners of the points' bounding rectangle.
pub fn bounding_corners(points: &[Point]) -> Option<(Point, Point)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

/// Check if a point is inside a closed polygon (ray casting algorithm).
pub fn polygon_contains(vertices: &[Point], point: &Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = &vertices[i];
        let vj = &vertices[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
