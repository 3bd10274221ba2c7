use nalgebra::{self as na, point, vector};

use crate::P2;

/// A trait for shapes that can be used to query the QuadTree. Shapes must be able to
/// check if they contain a point and if they share any space with a node's bounds.
///
/// Leaves whose bounds pass [`Shape::contains_rect`] return all their items without
/// testing each one. The provided `contains_rect` only checks the four corners, so
/// non-convex shapes must override it.
pub trait Shape {
    /// Check if the shape contains a point
    fn contains(&self, point: &P2) -> bool;
    /// Check if the shape shares any space with a rect
    fn intersects_rect(&self, rect: &Rect) -> bool;

    /// Check if the shape fully contains a given rect. Correct for convex shapes.
    fn contains_rect(&self, rect: &Rect) -> bool {
        rect.corners().iter().all(|c| self.contains(c))
    }
}

/// Represents an axis-aligned rectangle. The start corner holds the minimum x and y,
/// the end corner the maximum. It is used to define boundaries for QuadTree nodes and
/// provides utility functions for geometric calculations.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    start: P2,
    center: P2,
    end: P2,
}

impl Rect {
    /// Create a new rect from its center point and full width and height
    pub fn new(center: P2, width: f64, height: f64) -> Self {
        let half = vector![width / 2., height / 2.];
        Self {
            start: center - half,
            center,
            end: center + half,
        }
    }

    /// Create a new rect spanning two opposite corners
    pub fn from_corners(a: P2, b: P2) -> Self {
        let start = a.inf(&b);
        let end = a.sup(&b);
        Self {
            start,
            center: na::center(&start, &end),
            end,
        }
    }

    pub fn start(&self) -> P2 {
        self.start
    }

    pub fn end(&self) -> P2 {
        self.end
    }

    pub fn center(&self) -> P2 {
        self.center
    }

    pub fn width(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn height(&self) -> f64 {
        self.end.y - self.start.y
    }

    /// The four corners: bottom-left, bottom-right, top-left, top-right
    pub fn corners(&self) -> [P2; 4] {
        let Rect { start, end, .. } = *self;
        [
            start,
            point![end.x, start.y],
            point![start.x, end.y],
            end,
        ]
    }

    /// Quarter the rect to produce four smaller rects, ordered top-left, top-right,
    /// bottom-left, bottom-right (+y points up).
    ///
    /// The quarters share the parent's edges and center lines exactly, so together they
    /// cover every point the parent contains.
    pub fn quarter(&self) -> [Self; 4] {
        let &Rect { start, center, end } = self;

        [
            Rect::from_corners(point![start.x, center.y], point![center.x, end.y]),
            Rect::from_corners(center, end),
            Rect::from_corners(start, center),
            Rect::from_corners(point![center.x, start.y], point![end.x, center.y]),
        ]
    }

    /// Check if the rect shares any space with another rect. Touching edges count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.end.x < other.start.x
            || self.start.x > other.end.x
            || self.end.y < other.start.y
            || self.start.y > other.end.y)
    }
}

impl Shape for Rect {
    fn contains(&self, point: &P2) -> bool {
        point.x >= self.start.x
            && point.x <= self.end.x
            && point.y >= self.start.y
            && point.y <= self.end.y
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.intersects(rect)
    }
}

/// Represents a circle defined by a center point and radius.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    center: P2,
    radius: f64,
}

impl Circle {
    /// Create a new circle with a center point and radius. The sign of `radius` is
    /// dropped.
    pub fn new(center: P2, radius: f64) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    pub fn center(&self) -> P2 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the center point of the circle
    pub fn set_center(&mut self, center: P2) {
        self.center = center;
    }

    /// Set the radius of the circle. The sign of `radius` is dropped.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.abs();
    }
}

impl Shape for Circle {
    fn contains(&self, point: &P2) -> bool {
        na::distance_squared(&self.center, point) <= self.radius * self.radius
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        let half_w = rect.width() / 2.;
        let half_h = rect.height() / 2.;
        let dx = (self.center.x - rect.center.x).abs();
        let dy = (self.center.y - rect.center.y).abs();

        if dx > half_w + self.radius || dy > half_h + self.radius {
            return false;
        }
        if dx <= half_w || dy <= half_h {
            return true;
        }

        // nearest corner
        (dx - half_w).powi(2) + (dy - half_h).powi(2) <= self.radius * self.radius
    }
}
