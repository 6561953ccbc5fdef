//! Token-level parsers shared by the transform and path data grammars.
//!
//! Both grammars are sequences of numbers separated by whitespace and/or a
//! single comma (`comma-wsp` in SVG terms), so they share one input type and
//! one number parser.

use winnow::{
    Parser as _,
    ascii::{float, multispace0},
    combinator::opt,
    error::ModalResult,
    stream::{LocatingSlice, Location},
};

use crate::span::Span;

pub(crate) type Input<'a> = LocatingSlice<&'a str>;

/// Parses a finite floating point number (`inf` and `nan` are rejected).
pub(crate) fn number(input: &mut Input<'_>) -> ModalResult<f64> {
    float.verify(|value: &f64| value.is_finite()).parse_next(input)
}

/// Skips whitespace.
pub(crate) fn wsp(input: &mut Input<'_>) {
    let _: ModalResult<&str> = multispace0.parse_next(input);
}

/// Skips `comma-wsp`: whitespace, at most one comma, whitespace.
pub(crate) fn comma_wsp(input: &mut Input<'_>) {
    wsp(input);
    let _: ModalResult<Option<char>> = opt(',').parse_next(input);
    wsp(input);
}

/// Returns the span of the whitespace/comma delimited fragment at the current
/// position, at least one character wide when input remains.
pub(crate) fn fragment_span(input: &Input<'_>) -> Span {
    let start = input.current_token_start();
    let rest: &str = input;
    let len = rest
        .find(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == ')')
        .unwrap_or(rest.len());
    let len = if len == 0 {
        rest.chars().next().map_or(0, char::len_utf8)
    } else {
        len
    };
    Span::new(start..start + len)
}

/// Returns the next character without consuming it.
pub(crate) fn peek_char(input: &Input<'_>) -> Option<char> {
    let rest: &str = input;
    rest.chars().next()
}
