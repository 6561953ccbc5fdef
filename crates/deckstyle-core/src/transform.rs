//! Transform attributes and the affine composer.
//!
//! A `transform` attribute holds exactly one of three functions, modelled by
//! [`Transform`]. Every form lowers to a 2×3 affine [`Matrix`] with the SVG
//! convention:
//!
//! ```text
//! x' = a*x + c*y + e
//! y' = b*x + d*y + f
//! ```
//!
//! [`compose`] multiplies two transforms so that the inner one is applied
//! first.

use std::fmt;

use crate::{
    format,
    geometry::{Extremes, Point},
};

/// A 2×3 affine matrix `(a, b, c, d, e, f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    /// The identity mapping.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A pure translation.
    pub fn from_translation(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    /// A pure scale about the origin.
    pub fn from_scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn e(&self) -> f64 {
        self.e
    }

    pub fn f(&self) -> f64 {
        self.f
    }

    /// Returns the translation part `(e, f)`.
    pub fn translation(&self) -> Point {
        Point::new(self.e, self.f)
    }

    /// Returns a copy with the translation part replaced.
    pub fn with_translation(self, e: f64, f: f64) -> Self {
        Self { e, f, ..self }
    }

    /// Maps a point through the matrix.
    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            self.a * point.x() + self.c * point.y() + self.e,
            self.b * point.x() + self.d * point.y() + self.f,
        )
    }

    /// Returns `self ∘ inner`: the matrix that applies `inner` first and then
    /// `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use deckstyle_core::{geometry::Point, transform::Matrix};
    /// let scale = Matrix::from_scale(2.0, 2.0);
    /// let shift = Matrix::from_translation(1.0, 0.0);
    ///
    /// // Shift first, then scale.
    /// let combined = scale.multiply(&shift);
    /// assert_eq!(combined.apply(Point::new(1.0, 1.0)), Point::new(4.0, 2.0));
    /// ```
    pub fn multiply(&self, inner: &Matrix) -> Matrix {
        Matrix {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    /// Maps the four corners of `extremes` and returns their axis-aligned box.
    pub fn apply_extremes(&self, extremes: Extremes) -> Extremes {
        Extremes::from_points(extremes.corners().map(|corner| self.apply(corner)))
            .unwrap_or(extremes)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Writes `matrix(a,b,c,d,e,f)`.
///
/// The linear part uses the shortest exact representation so values that
/// were parsed from a document are written back unchanged; the translation
/// part is written with four decimal places.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matrix({},{},{},{},{},{})",
            format::shortest(self.a),
            format::shortest(self.b),
            format::shortest(self.c),
            format::shortest(self.d),
            format::fixed(self.e),
            format::fixed(self.f),
        )
    }
}

/// The value of a `transform` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Translate { dx: f64, dy: f64 },
    Matrix(Matrix),
    Scale { sx: f64, sy: f64 },
}

impl Transform {
    /// Lowers the transform to its affine matrix.
    pub fn to_matrix(&self) -> Matrix {
        match *self {
            Transform::Translate { dx, dy } => Matrix::from_translation(dx, dy),
            Transform::Matrix(matrix) => matrix,
            Transform::Scale { sx, sy } => Matrix::from_scale(sx, sy),
        }
    }

    /// Maps a point through the transform.
    ///
    /// # Examples
    ///
    /// ```
    /// # use deckstyle_core::{geometry::Point, transform::Transform};
    /// let t = Transform::Scale { sx: 2.0, sy: 3.0 };
    /// assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(2.0, 3.0));
    /// ```
    pub fn apply(&self, point: Point) -> Point {
        match *self {
            Transform::Translate { dx, dy } => point.add_point(Point::new(dx, dy)),
            Transform::Matrix(matrix) => matrix.apply(point),
            Transform::Scale { sx, sy } => point.scale_xy(sx, sy),
        }
    }

    /// Maps `extremes` corner-wise and returns the box of the mapped corners.
    pub fn apply_extremes(&self, extremes: Extremes) -> Extremes {
        match *self {
            Transform::Translate { dx, dy } => extremes.translate(Point::new(dx, dy)),
            _ => self.to_matrix().apply_extremes(extremes),
        }
    }
}

impl From<Matrix> for Transform {
    fn from(matrix: Matrix) -> Self {
        Transform::Matrix(matrix)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Translate { dx, dy } => {
                write!(f, "translate({},{})", format::fixed(*dx), format::fixed(*dy))
            }
            Transform::Matrix(matrix) => write!(f, "{matrix}"),
            Transform::Scale { sx, sy } => {
                write!(f, "scale({},{})", format::shortest(*sx), format::shortest(*sy))
            }
        }
    }
}

/// Composes two transforms: the result applies `inner` first, then `outer`.
///
/// # Examples
///
/// ```
/// # use deckstyle_core::{geometry::Point, transform::{compose, Transform}};
/// let outer = Transform::Translate { dx: 10.0, dy: 0.0 };
/// let inner = Transform::Scale { sx: 2.0, sy: 2.0 };
///
/// let m = compose(&outer, &inner);
/// assert_eq!(m.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
/// ```
pub fn compose(outer: &Transform, inner: &Transform) -> Matrix {
    outer.to_matrix().multiply(&inner.to_matrix())
}

/// Applies an optional transform, treating `None` as the identity.
pub fn apply_optional(transform: Option<&Transform>, point: Point) -> Point {
    transform.map_or(point, |t| t.apply(point))
}
