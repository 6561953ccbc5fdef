//! Typed path data commands and the cursor walk that bounds them.
//!
//! Path data is reduced to the points a pen visits. Curves and arcs only
//! contribute their end point, so the resulting extremes are those of the
//! polyline through segment end points, not of the drawn curve.

use std::fmt;

use crate::geometry::{Extremes, Point};

/// Whether a command's coordinates are absolute (uppercase letter) or
/// relative to the current point (lowercase letter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Absolute,
    Relative,
}

impl Position {
    /// Classifies a command letter by its case.
    pub fn from_letter(letter: char) -> Self {
        if letter.is_ascii_uppercase() {
            Position::Absolute
        } else {
            Position::Relative
        }
    }

    fn apply_case(self, letter: char) -> char {
        match self {
            Position::Absolute => letter.to_ascii_uppercase(),
            Position::Relative => letter.to_ascii_lowercase(),
        }
    }
}

/// Elliptical arc operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub radii: Point,
    pub x_axis_rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub end: Point,
}

/// A single path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    Move(Position, Point),
    Line(Position, Point),
    HorizontalLine(Position, f64),
    VerticalLine(Position, f64),
    CubicCurve {
        position: Position,
        control1: Point,
        control2: Point,
        end: Point,
    },
    Arc(Position, Arc),
    Close(Position),
}

impl PathCommand {
    pub fn position(&self) -> Position {
        match *self {
            PathCommand::Move(position, _)
            | PathCommand::Line(position, _)
            | PathCommand::HorizontalLine(position, _)
            | PathCommand::VerticalLine(position, _)
            | PathCommand::CubicCurve { position, .. }
            | PathCommand::Arc(position, _)
            | PathCommand::Close(position) => position,
        }
    }

    /// Returns the command letter, with its case restored from the position.
    pub fn letter(&self) -> char {
        let letter = match self {
            PathCommand::Move(..) => 'M',
            PathCommand::Line(..) => 'L',
            PathCommand::HorizontalLine(..) => 'H',
            PathCommand::VerticalLine(..) => 'V',
            PathCommand::CubicCurve { .. } => 'C',
            PathCommand::Arc(..) => 'A',
            PathCommand::Close(..) => 'Z',
        };
        self.position().apply_case(letter)
    }

    /// Returns the point the pen rests on after this command, or `None` for
    /// Close, which leaves the cursor where it is.
    pub fn end_point(&self, cursor: Point) -> Option<Point> {
        let resolve = |position: Position, p: Point| match position {
            Position::Absolute => p,
            Position::Relative => cursor.add_point(p),
        };

        match *self {
            PathCommand::Move(position, p) | PathCommand::Line(position, p) => {
                Some(resolve(position, p))
            }
            PathCommand::HorizontalLine(position, x) => Some(match position {
                Position::Absolute => Point::new(x, cursor.y()),
                Position::Relative => Point::new(cursor.x() + x, cursor.y()),
            }),
            PathCommand::VerticalLine(position, y) => Some(match position {
                Position::Absolute => Point::new(cursor.x(), y),
                Position::Relative => Point::new(cursor.x(), cursor.y() + y),
            }),
            PathCommand::CubicCurve { position, end, .. } => Some(resolve(position, end)),
            PathCommand::Arc(position, arc) => Some(resolve(position, arc.end)),
            PathCommand::Close(_) => None,
        }
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = self.letter();
        match self {
            PathCommand::Move(_, p) | PathCommand::Line(_, p) => {
                write!(f, "{letter}{},{}", p.x(), p.y())
            }
            PathCommand::HorizontalLine(_, v) | PathCommand::VerticalLine(_, v) => {
                write!(f, "{letter}{v}")
            }
            PathCommand::CubicCurve {
                control1,
                control2,
                end,
                ..
            } => write!(
                f,
                "{letter}{},{} {},{} {},{}",
                control1.x(),
                control1.y(),
                control2.x(),
                control2.y(),
                end.x(),
                end.y()
            ),
            PathCommand::Arc(_, arc) => write!(
                f,
                "{letter}{},{} {} {} {} {},{}",
                arc.radii.x(),
                arc.radii.y(),
                arc.x_axis_rotation,
                u8::from(arc.large_arc),
                u8::from(arc.sweep),
                arc.end.x(),
                arc.end.y()
            ),
            PathCommand::Close(_) => write!(f, "{letter}"),
        }
    }
}

/// Walks commands with a running cursor and collects the visited points.
///
/// The cursor starts at the origin; the origin itself only counts as visited
/// when no command moves the pen.
#[derive(Debug, Default)]
pub struct PathCursor {
    current: Point,
    extremes: Option<Extremes>,
}

impl PathCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current pen position.
    pub fn current(&self) -> Point {
        self.current
    }

    /// Advances the cursor over one command.
    pub fn advance(&mut self, command: &PathCommand) {
        if let Some(point) = command.end_point(self.current) {
            self.current = point;
            self.extremes = Some(match self.extremes {
                Some(extremes) => extremes.include(point),
                None => Extremes::from_point(point),
            });
        }
    }

    /// Returns the extremes of every visited point.
    pub fn finish(self) -> Extremes {
        self.extremes
            .unwrap_or_else(|| Extremes::from_point(Point::default()))
    }
}

/// Computes the extremes of a stream of parsed commands, stopping at the
/// first error.
///
/// # Examples
///
/// ```
/// # use deckstyle_core::{geometry::{Extremes, Point}, path::{path_extremes, PathCommand, Position}};
/// let commands = [
///     PathCommand::Move(Position::Absolute, Point::new(10.0, 10.0)),
///     PathCommand::Line(Position::Relative, Point::new(5.0, -3.0)),
///     PathCommand::VerticalLine(Position::Absolute, 20.0),
///     PathCommand::Close(Position::Absolute),
/// ];
/// let extremes = path_extremes(commands.into_iter().map(Ok::<_, ()>)).unwrap();
/// assert_eq!(extremes, Extremes::new(10.0, 7.0, 15.0, 20.0));
/// ```
pub fn path_extremes<E>(
    commands: impl IntoIterator<Item = Result<PathCommand, E>>,
) -> Result<Extremes, E> {
    let mut cursor = PathCursor::new();
    for command in commands {
        cursor.advance(&command?);
    }
    Ok(cursor.finish())
}
