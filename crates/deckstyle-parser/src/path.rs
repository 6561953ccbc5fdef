//! Lazy parser for path `d` attribute values.
//!
//! [`parse_path`] returns a [`PathParser`], an iterator that yields one
//! [`PathCommand`] per segment. Nothing is parsed ahead of the consumer, so a
//! caller that only needs the first few segments never pays for the rest.
//!
//! Supported commands are `M L H V Z C A` in both cases. Coordinate groups
//! that follow a command without a new letter repeat it; after a move they
//! repeat as line-to with the same case.

use winnow::{
    Parser as _,
    stream::{LocatingSlice, Location, Stream},
    token::one_of,
};

use deckstyle_core::{
    geometry::Point,
    path::{Arc, PathCommand, Position},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    scan::{self, Input},
    span::Span,
};

/// Iterator over the commands of a path data string.
///
/// After the first error the iterator is exhausted.
///
/// # Examples
///
/// ```
/// # use deckstyle_parser::parse_path;
/// # use deckstyle_core::{geometry::Point, path::{PathCommand, Position}};
/// let mut commands = parse_path("M10,20 5,5 z");
///
/// assert_eq!(
///     commands.next().unwrap().unwrap(),
///     PathCommand::Move(Position::Absolute, Point::new(10.0, 20.0))
/// );
/// // Implicit repetition after a move is a line.
/// assert_eq!(
///     commands.next().unwrap().unwrap(),
///     PathCommand::Line(Position::Absolute, Point::new(5.0, 5.0))
/// );
/// assert_eq!(
///     commands.next().unwrap().unwrap(),
///     PathCommand::Close(Position::Relative)
/// );
/// assert!(commands.next().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathParser<'a> {
    input: Input<'a>,
    previous: Option<char>,
    done: bool,
}

/// Starts parsing path data.
pub fn parse_path(source: &str) -> PathParser<'_> {
    PathParser {
        input: LocatingSlice::new(source),
        previous: None,
        done: false,
    }
}

impl<'a> PathParser<'a> {
    /// Reads the next command letter, or decides which command an implicit
    /// coordinate group repeats.
    fn command_letter(&mut self) -> Result<char, Diagnostic> {
        let next = scan::peek_char(&self.input).unwrap_or_default();

        if next.is_ascii_alphabetic() {
            let span = scan::fragment_span(&self.input);
            let start = span.start();
            self.input.next_token();
            if !"MLHVZCA".contains(next.to_ascii_uppercase()) {
                return Err(Diagnostic::error(format!("unsupported path command `{next}`"))
                    .with_code(ErrorCode::E103)
                    .with_label(
                        Span::new(start..start + next.len_utf8()),
                        ErrorCode::E103.description(),
                    )
                    .with_help("supported commands are M, L, H, V, Z, C and A"));
            }
            return Ok(next);
        }

        match self.previous {
            None => Err(Diagnostic::error("path data must start with a command")
                .with_code(ErrorCode::E103)
                .with_label(scan::fragment_span(&self.input), "expected `M` or `m`")),
            Some('Z' | 'z') => Err(Diagnostic::error("coordinates after close path")
                .with_code(ErrorCode::E102)
                .with_label(scan::fragment_span(&self.input), "expected a command")),
            Some('M') => Ok('L'),
            Some('m') => Ok('l'),
            Some(letter) => Ok(letter),
        }
    }

    /// Parses one numeric operand of `letter`.
    fn operand(&mut self, letter: char) -> Result<f64, Diagnostic> {
        scan::comma_wsp(&mut self.input);

        match scan::peek_char(&self.input) {
            None => {
                let end = self.input.current_token_start();
                return Err(missing_operands(letter, Span::new(end..end)));
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.input.current_token_start();
                return Err(missing_operands(letter, Span::new(start..start + 1)));
            }
            Some(_) => {}
        }

        let span = scan::fragment_span(&self.input);
        scan::number(&mut self.input).map_err(|_| {
            Diagnostic::error(format!("invalid number in `{letter}` command"))
                .with_code(ErrorCode::E102)
                .with_label(span, "not a number")
        })
    }

    fn point(&mut self, letter: char) -> Result<Point, Diagnostic> {
        let x = self.operand(letter)?;
        let y = self.operand(letter)?;
        Ok(Point::new(x, y))
    }

    /// Parses an arc flag, which is a single `0` or `1` and may be written
    /// without a separator before the next operand.
    fn flag(&mut self, letter: char) -> Result<bool, Diagnostic> {
        scan::comma_wsp(&mut self.input);
        if scan::peek_char(&self.input).is_none() {
            let end = self.input.current_token_start();
            return Err(missing_operands(letter, Span::new(end..end)));
        }

        let span = scan::fragment_span(&self.input);
        one_of::<_, _, winnow::error::ContextError>(['0', '1'])
            .map(|c: char| c == '1')
            .parse_next(&mut self.input)
            .map_err(|_| {
                Diagnostic::error("arc flags must be `0` or `1`")
                    .with_code(ErrorCode::E102)
                    .with_label(span, "invalid flag")
            })
    }

    fn command(&mut self) -> Result<PathCommand, Diagnostic> {
        let letter = self.command_letter()?;
        let position = Position::from_letter(letter);

        let command = match letter.to_ascii_uppercase() {
            'M' => PathCommand::Move(position, self.point(letter)?),
            'L' => PathCommand::Line(position, self.point(letter)?),
            'H' => PathCommand::HorizontalLine(position, self.operand(letter)?),
            'V' => PathCommand::VerticalLine(position, self.operand(letter)?),
            'C' => PathCommand::CubicCurve {
                position,
                control1: self.point(letter)?,
                control2: self.point(letter)?,
                end: self.point(letter)?,
            },
            'A' => {
                let radii = self.point(letter)?;
                let x_axis_rotation = self.operand(letter)?;
                let large_arc = self.flag(letter)?;
                let sweep = self.flag(letter)?;
                let end = self.point(letter)?;
                PathCommand::Arc(
                    position,
                    Arc {
                        radii,
                        x_axis_rotation,
                        large_arc,
                        sweep,
                        end,
                    },
                )
            }
            _ => PathCommand::Close(position),
        };

        self.previous = Some(letter);
        Ok(command)
    }

    /// Skips the separator between segments. A comma is only allowed where
    /// an implicit repetition may follow.
    fn skip_separator(&mut self) {
        scan::wsp(&mut self.input);
        if self.previous.is_some() && scan::peek_char(&self.input) == Some(',') {
            scan::comma_wsp(&mut self.input);
        }
    }
}

impl Iterator for PathParser<'_> {
    type Item = Result<PathCommand, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.skip_separator();
        if scan::peek_char(&self.input).is_none() {
            self.done = true;
            return None;
        }

        let command = self.command();
        if command.is_err() {
            self.done = true;
        }
        Some(command)
    }
}

fn missing_operands(letter: char, span: Span) -> Diagnostic {
    Diagnostic::error(format!("missing operands for `{letter}` command"))
        .with_code(ErrorCode::E104)
        .with_label(span, ErrorCode::E104.description())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(source: &str) -> Vec<PathCommand> {
        parse_path(source)
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|err| panic!("{source:?}: {err}"))
    }

    fn first_error(source: &str) -> Diagnostic {
        parse_path(source)
            .find_map(Result::err)
            .unwrap_or_else(|| panic!("{source:?} parsed"))
    }

    #[test]
    fn test_basic_commands() {
        let parsed = commands("M0,0 L10,0 H20 V5 Z");
        assert_eq!(
            parsed,
            vec![
                PathCommand::Move(Position::Absolute, Point::new(0.0, 0.0)),
                PathCommand::Line(Position::Absolute, Point::new(10.0, 0.0)),
                PathCommand::HorizontalLine(Position::Absolute, 20.0),
                PathCommand::VerticalLine(Position::Absolute, 5.0),
                PathCommand::Close(Position::Absolute),
            ]
        );
    }

    #[test]
    fn test_case_is_preserved() {
        let letters: String = commands("m1,1 l2,2 h3 v4 c1,1 2,2 3,3 a1,1 0 0 1 5,5 z")
            .iter()
            .map(PathCommand::letter)
            .collect();
        assert_eq!(letters, "mlhvcaz");
    }

    #[test]
    fn test_implicit_repetition() {
        let parsed = commands("m1,2 3,4 5,6");
        assert_eq!(parsed[1], PathCommand::Line(Position::Relative, Point::new(3.0, 4.0)));
        assert_eq!(parsed[2], PathCommand::Line(Position::Relative, Point::new(5.0, 6.0)));

        let parsed = commands("H1 2 3");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2], PathCommand::HorizontalLine(Position::Absolute, 3.0));

        let parsed = commands("C1,1,2,2,3,3,4,4,5,5,6,6");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_compact_numbers() {
        let parsed = commands("M10-20L.5.5");
        assert_eq!(parsed[0], PathCommand::Move(Position::Absolute, Point::new(10.0, -20.0)));
        assert_eq!(parsed[1], PathCommand::Line(Position::Absolute, Point::new(0.5, 0.5)));
    }

    #[test]
    fn test_arc_flags_without_separators() {
        let parsed = commands("M0,0 a5,5 0 1110,10");
        let PathCommand::Arc(position, arc) = parsed[1] else {
            panic!("expected an arc, got {:?}", parsed[1]);
        };
        assert_eq!(position, Position::Relative);
        assert!(arc.large_arc);
        assert!(arc.sweep);
        assert_eq!(arc.end, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_empty_path() {
        assert!(commands("").is_empty());
        assert!(commands("  \n ").is_empty());
    }

    #[test]
    fn test_unsupported_command() {
        let err = first_error("M0,0 Q10,10 20,20");
        assert_eq!(err.code(), Some(ErrorCode::E103));
        assert_eq!(err.labels()[0].span(), Span::new(5..6));
    }

    #[test]
    fn test_missing_operands() {
        assert_eq!(first_error("M0").code(), Some(ErrorCode::E104));
        assert_eq!(first_error("M0,0 C1,1 2,2 L3,3").code(), Some(ErrorCode::E104));
        assert_eq!(first_error("M0,0 A1,1 0 0").code(), Some(ErrorCode::E104));
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(first_error("M0,0 L#,1").code(), Some(ErrorCode::E102));
        assert_eq!(first_error("M0,0 A1,1 0 2 0 1,1").code(), Some(ErrorCode::E102));
        assert_eq!(first_error("M0,0 Z 1,1").code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_must_start_with_command() {
        assert_eq!(first_error("10,10").code(), Some(ErrorCode::E103));
    }

    #[test]
    fn test_exhausted_after_error() {
        let mut parser = parse_path("M0,0 Q1,1 L2,2");
        assert!(parser.next().unwrap().is_ok());
        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_lazy_prefix_is_usable() {
        // Only the first segment is consumed; the broken tail is never read.
        let mut parser = parse_path("M1,2 Q broken");
        assert_eq!(
            parser.next().unwrap().unwrap(),
            PathCommand::Move(Position::Absolute, Point::new(1.0, 2.0))
        );
    }
}
