//! Parser for `transform` attribute values.
//!
//! Exactly one transform function is accepted per attribute:
//!
//! ```text
//! transform := wsp* function wsp*
//! function  := ("translate" | "scale") wsp* "(" number (comma-wsp number)? ")"
//!            | "matrix" wsp* "(" number (comma-wsp number){5} ")"
//! ```

use log::trace;
use winnow::{
    Parser as _,
    error::ModalResult,
    stream::{LocatingSlice, Location, Stream},
    token::take_while,
};

use deckstyle_core::transform::{Matrix, Transform};

use crate::{
    error::{Diagnostic, ErrorCode, ParseError},
    scan::{self, Input},
    span::Span,
};

const SUPPORTED_HELP: &str = "supported forms are `translate(x[,y])`, `scale(x[,y])` and `matrix(a,b,c,d,e,f)`";

/// Parses a `transform` attribute value.
///
/// # Examples
///
/// ```
/// # use deckstyle_parser::parse_transform;
/// # use deckstyle_core::transform::Transform;
/// let t = parse_transform(" translate(10, -2.5) ").unwrap();
/// assert_eq!(t, Transform::Translate { dx: 10.0, dy: -2.5 });
///
/// let t = parse_transform("scale(2)").unwrap();
/// assert_eq!(t, Transform::Scale { sx: 2.0, sy: 2.0 });
///
/// assert!(parse_transform("translate(1,2) scale(3)").is_err());
/// ```
pub fn parse_transform(source: &str) -> Result<Transform, ParseError> {
    let mut input = LocatingSlice::new(source);

    scan::wsp(&mut input);
    let first_start = input.current_token_start();
    let transform = function(&mut input)?;
    let first = Span::new(first_start..input.current_token_start());
    scan::wsp(&mut input);

    if let Some(next) = scan::peek_char(&input) {
        let start = input.current_token_start();
        let span = Span::new(start..source.len());
        let diagnostic = if next == ',' || next.is_ascii_alphabetic() {
            Diagnostic::error("chained transforms are not supported")
                .with_code(ErrorCode::E101)
                .with_label(span, "second transform function")
                .with_secondary_label(first, "only this transform is supported")
                .with_help("apply the remaining transforms on a wrapping group")
        } else {
            Diagnostic::error("unexpected characters after transform")
                .with_code(ErrorCode::E100)
                .with_label(span, "trailing input")
        };
        return Err(diagnostic.into());
    }

    trace!(transform:?; "Parsed transform");
    Ok(transform)
}

fn function_name<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)
}

/// Parses one transform function including its argument list.
fn function(input: &mut Input<'_>) -> Result<Transform, Diagnostic> {
    let start = input.current_token_start();

    let Ok(name) = function_name(input) else {
        let span = scan::fragment_span(input);
        let message = if span.is_empty() {
            "empty transform".to_string()
        } else {
            "expected a transform function".to_string()
        };
        return Err(Diagnostic::error(message)
            .with_code(ErrorCode::E100)
            .with_label(span, ErrorCode::E100.description())
            .with_help(SUPPORTED_HELP));
    };
    let name_span = Span::new(start..input.current_token_start());

    let arity: &[usize] = match name {
        "translate" | "scale" => &[1, 2],
        "matrix" => &[6],
        _ => {
            return Err(
                Diagnostic::error(format!("unsupported transform function `{name}`"))
                    .with_code(ErrorCode::E100)
                    .with_label(name_span, "unsupported function")
                    .with_help(SUPPORTED_HELP),
            );
        }
    };

    scan::wsp(input);
    if scan::peek_char(input) != Some('(') {
        return Err(Diagnostic::error(format!("expected `(` after `{name}`"))
            .with_code(ErrorCode::E100)
            .with_label(scan::fragment_span(input), "expected `(`"));
    }
    input.next_token();

    let arguments = arguments(input, name)?;
    let span = Span::new(start..input.current_token_start());

    if !arity.contains(&arguments.len()) {
        let expected = match arity {
            [n] => n.to_string(),
            _ => "1 or 2".to_string(),
        };
        return Err(Diagnostic::error(format!(
            "`{name}` takes {expected} arguments, found {}",
            arguments.len()
        ))
        .with_code(ErrorCode::E100)
        .with_label(span, "wrong number of arguments"));
    }

    Ok(match (name, arguments.as_slice()) {
        ("translate", [dx]) => Transform::Translate { dx: *dx, dy: 0.0 },
        ("translate", [dx, dy]) => Transform::Translate { dx: *dx, dy: *dy },
        ("scale", [s]) => Transform::Scale { sx: *s, sy: *s },
        ("scale", [sx, sy]) => Transform::Scale { sx: *sx, sy: *sy },
        (_, [a, b, c, d, e, f]) => Transform::Matrix(Matrix::new(*a, *b, *c, *d, *e, *f)),
        _ => unreachable!("arity checked above"),
    })
}

/// Parses the numbers of an argument list up to and including `)`.
fn arguments(input: &mut Input<'_>, name: &str) -> Result<Vec<f64>, Diagnostic> {
    let mut values = Vec::new();
    scan::wsp(input);

    loop {
        match scan::peek_char(input) {
            Some(')') => {
                input.next_token();
                return Ok(values);
            }
            None => {
                let end = input.current_token_start();
                return Err(Diagnostic::error(format!("unclosed `{name}(`"))
                    .with_code(ErrorCode::E100)
                    .with_label(Span::new(end..end), "expected `)`"));
            }
            Some(_) => {}
        }

        if !values.is_empty() {
            scan::comma_wsp(input);
        }

        let span = scan::fragment_span(input);
        let value = scan::number(input).map_err(|_| {
            Diagnostic::error(format!("invalid argument to `{name}`"))
                .with_code(ErrorCode::E100)
                .with_label(span, "expected a number")
        })?;
        values.push(value);
        scan::wsp(input);
    }
}
