//! Geometric primitives for resolving element positions.
//!
//! This module provides the fundamental geometric types used throughout
//! deckstyle for calculating positions, sizes, and bounding boxes of artwork
//! elements.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in document space
//! - [`Size`] - Width and height dimensions
//! - [`Extremes`] - An axis-aligned bounding box defined by minimum and maximum coordinates
//!
//! # Coordinate System
//!
//! Coordinates follow SVG user space:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! All coordinates are `f64`: positions are compared against a `1e-3`
//! tolerance after several rounds of composition, which `f32` cannot hold for
//! artwork several thousand units wide.

/// A 2D point in document coordinate space.
///
/// # Examples
///
/// ```
/// # use deckstyle_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let diff = p1.sub_point(p2);
/// assert_eq!(diff.x(), 5.0);
/// assert_eq!(diff.y(), 15.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Checks if both x and y coordinates are exactly zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Multiplies each coordinate by its own factor.
    pub fn scale_xy(self, sx: f64, sy: f64) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
        }
    }

    /// Returns `true` when both coordinates are within `tolerance` of `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use deckstyle_core::geometry::Point;
    /// let a = Point::new(1.0, 2.0);
    /// assert!(a.approx_eq(Point::new(1.0004, 1.9996), 1e-3));
    /// assert!(!a.approx_eq(Point::new(1.01, 2.0), 1e-3));
    /// ```
    pub fn approx_eq(self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f64 {
        self.height
    }

    /// Checks if both dimensions are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// An axis-aligned bounding box `(min_x, min_y, max_x, max_y)`.
///
/// Extremes describe an element's geometry in its own local space, before the
/// element's `transform` attribute is applied. Corner-wise transformation
/// through [`crate::transform::Transform::apply_extremes`] yields the box of
/// the transformed corners, not a tight rotated box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extremes {
    min: Point,
    max: Point,
}

impl Extremes {
    /// Creates extremes from explicit minimum and maximum corners.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    /// Creates zero-sized extremes located at a single point.
    pub fn from_point(point: Point) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Creates extremes from a top-left corner and a size.
    pub fn from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min: top_left,
            max: Point::new(top_left.x() + size.width(), top_left.y() + size.height()),
        }
    }

    /// Creates the smallest extremes enclosing every point, or `None` if the
    /// iterator is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use deckstyle_core::geometry::{Extremes, Point};
    /// let points = [Point::new(3.0, 1.0), Point::new(-2.0, 4.0), Point::new(0.0, 0.0)];
    /// let extremes = Extremes::from_points(points).unwrap();
    /// assert_eq!(extremes, Extremes::new(-2.0, 0.0, 3.0, 4.0));
    ///
    /// assert!(Extremes::from_points(Vec::<Point>::new()).is_none());
    /// ```
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::from_point(first), |acc, p| acc.include(p)))
    }

    /// Returns the minimum x-coordinate
    pub fn min_x(self) -> f64 {
        self.min.x()
    }

    /// Returns the minimum y-coordinate
    pub fn min_y(self) -> f64 {
        self.min.y()
    }

    /// Returns the maximum x-coordinate
    pub fn max_x(self) -> f64 {
        self.max.x()
    }

    /// Returns the maximum y-coordinate
    pub fn max_y(self) -> f64 {
        self.max.y()
    }

    /// Returns the top-left corner, which is what the resolver reports as an
    /// element's position.
    pub fn top_left(self) -> Point {
        self.min
    }

    /// Returns the width and height spanned by these extremes.
    pub fn size(self) -> Size {
        Size::new(self.max.x() - self.min.x(), self.max.y() - self.min.y())
    }

    /// Returns the four corners in clockwise order starting at the top-left.
    pub fn corners(self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x(), self.min.y()),
            self.max,
            Point::new(self.min.x(), self.max.y()),
        ]
    }

    /// Grows the extremes so they contain `point`.
    pub fn include(self, point: Point) -> Self {
        Self {
            min: Point::new(self.min.x().min(point.x()), self.min.y().min(point.y())),
            max: Point::new(self.max.x().max(point.x()), self.max.y().max(point.y())),
        }
    }

    /// Returns the union of two extremes.
    pub fn merge(&self, other: &Self) -> Self {
        self.include(other.min).include(other.max)
    }

    /// Moves the extremes by `offset`.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min: self.min.add_point(offset),
            max: self.max.add_point(offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(10.5, 20.5);
        assert_eq!(point.x(), 10.5);
        assert_eq!(point.y(), 20.5);
    }

    #[test]
    fn test_point_is_zero() {
        assert!(Point::default().is_zero());
        assert!(!Point::new(0.0, 0.001).is_zero());
    }

    #[test]
    fn test_point_add_sub() {
        let p1 = Point::new(10.0, 20.0);
        let p2 = Point::new(5.0, -3.0);

        assert_eq!(p1.add_point(p2), Point::new(15.0, 17.0));
        assert_eq!(p1.sub_point(p2), Point::new(5.0, 23.0));
    }

    #[test]
    fn test_point_scale_xy() {
        let scaled = Point::new(2.0, 3.0).scale_xy(2.0, -1.0);
        assert_eq!(scaled, Point::new(4.0, -3.0));
    }

    #[test]
    fn test_point_approx_eq_is_strict_at_tolerance() {
        let a = Point::new(0.0, 0.0);
        assert!(!a.approx_eq(Point::new(0.001, 0.0), 1e-3));
        assert!(a.approx_eq(Point::new(0.0009, -0.0009), 1e-3));
    }

    #[test]
    fn test_extremes_from_top_left() {
        let extremes = Extremes::from_top_left(Point::new(10.0, 20.0), Size::new(5.0, 8.0));

        assert_eq!(extremes.min_x(), 10.0);
        assert_eq!(extremes.min_y(), 20.0);
        assert_eq!(extremes.max_x(), 15.0);
        assert_eq!(extremes.max_y(), 28.0);
        assert_eq!(extremes.size(), Size::new(5.0, 8.0));
    }

    #[test]
    fn test_extremes_corners() {
        let corners = Extremes::new(0.0, 1.0, 2.0, 3.0).corners();
        assert_eq!(corners[0], Point::new(0.0, 1.0));
        assert_eq!(corners[1], Point::new(2.0, 1.0));
        assert_eq!(corners[2], Point::new(2.0, 3.0));
        assert_eq!(corners[3], Point::new(0.0, 3.0));
    }

    #[test]
    fn test_extremes_merge() {
        let a = Extremes::new(0.0, 0.0, 10.0, 10.0);
        let b = Extremes::new(-5.0, 2.0, 4.0, 20.0);

        assert_eq!(a.merge(&b), Extremes::new(-5.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn test_extremes_translate() {
        let moved = Extremes::new(1.0, 2.0, 3.0, 4.0).translate(Point::new(-1.0, 0.5));

        assert_approx_eq!(f64, moved.min_x(), 0.0);
        assert_approx_eq!(f64, moved.min_y(), 2.5);
        assert_approx_eq!(f64, moved.max_x(), 2.0);
        assert_approx_eq!(f64, moved.max_y(), 4.5);
    }

    #[test]
    fn test_extremes_single_point_has_zero_size() {
        let extremes = Extremes::from_point(Point::new(7.0, -7.0));
        assert!(extremes.size().is_zero());
        assert_eq!(extremes.top_left(), Point::new(7.0, -7.0));
    }
}
