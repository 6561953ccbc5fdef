//! # Deckstyle Parser
//!
//! Parsers for the three textual inputs of the deckstyle engine:
//!
//! - [`parse_transform`] - a `transform` attribute value into a
//!   [`Transform`](deckstyle_core::transform::Transform)
//! - [`parse_path`] - a path `d` attribute value into a lazy stream of
//!   [`PathCommand`](deckstyle_core::path::PathCommand)s
//! - [`elaborate_actions`] - a decoded action file into a typed
//!   [`ActionPlan`](deckstyle_core::action::ActionPlan)
//!
//! Every failure is reported as a [`ParseError`] wrapping one or more
//! [`Diagnostic`](error::Diagnostic)s with an [`ErrorCode`](error::ErrorCode)
//! and a [`Span`] into the parsed text.
//!
//! ## Usage
//!
//! ```
//! # use deckstyle_parser::{parse_path, parse_transform, ParseError};
//! # use deckstyle_core::{geometry::Point, path::path_extremes};
//! fn main() -> Result<(), ParseError> {
//!     let transform = parse_transform("translate(10,5)")?;
//!     let extremes = path_extremes(parse_path("M0,0 l4,3 h-8 z"))
//!         .map_err(ParseError::from)?;
//!
//!     let top_left = transform.apply(extremes.top_left());
//!     assert_eq!(top_left, Point::new(6.0, 5.0));
//!     Ok(())
//! }
//! ```

mod actions;
pub mod error;
mod path;
mod scan;
mod span;
mod transform;

pub use actions::elaborate_actions;
pub use error::ParseError;
pub use path::{PathParser, parse_path};
pub use span::Span;
pub use transform::parse_transform;
