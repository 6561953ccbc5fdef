//! Error and diagnostic system for the deckstyle parsers.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Labeled spans into the attribute value or action file
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, source
//! locations, and help text. Multiple diagnostics are wrapped in
//! [`ParseError`] for returning from a parser.
//!
//! # Example
//!
//! ```
//! # use deckstyle_parser::error::{Diagnostic, ErrorCode};
//! # use deckstyle_parser::Span;
//!
//! let diag = Diagnostic::error("chained transforms are not supported")
//!     .with_code(ErrorCode::E101)
//!     .with_label(Span::new(14..27), "second transform function")
//!     .with_help("move the second transform onto a wrapping group");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::{Label, LabelRole};
pub use parse_error::ParseError;
pub use severity::Severity;
