//! Error types for deckstyle operations.
//!
//! This module provides the main error type [`DeckstyleError`]. Every error
//! is fatal: the first one aborts the run and nothing is written.

use std::io;

use thiserror::Error;

use deckstyle_parser::ParseError;

/// The main error type for deckstyle operations.
///
/// # Diagnostic Variants
///
/// `MalformedTransform`, `MalformedPath` and `Actions` carry a [`ParseError`]
/// with spans into `src`, the text that failed to parse, so they can be
/// rendered with the offending fragment highlighted.
#[derive(Debug, Error)]
pub enum DeckstyleError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Action file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file that is missing, unparsable or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed transform on `{element}`: {err}")]
    MalformedTransform {
        element: String,
        err: ParseError,
        src: String,
    },

    #[error("Malformed path data on `{element}`: {err}")]
    MalformedPath {
        element: String,
        err: ParseError,
        src: String,
    },

    #[error("{err}")]
    Actions { err: ParseError, src: String },

    #[error("`{element}` references `{target}`, which does not exist")]
    UnresolvedReference { element: String, target: String },

    #[error("Cyclic or too deep reference chain: {chain}")]
    CyclicReference { chain: String },

    #[error("No element with id `{id}`")]
    UnknownElement { id: String },

    #[error("`{element}` is a `{tag}` element, which is not supported here")]
    UnsupportedElement { element: String, tag: String },

    #[error("Attribute `{attribute}` of `{element}` has invalid value `{value}`")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("Style property `{property}` is not set on `{element}`")]
    MissingStyleProperty { element: String, property: String },

    #[error("Style property `{property}` of `{element}` is not numeric: `{value}`")]
    InvalidStyleValue {
        element: String,
        property: String,
        value: String,
    },

    #[error("Action `{action}` targets `{element}`, which is not part of card `{card}`")]
    MissingTarget {
        card: String,
        element: String,
        action: String,
    },

    #[error(
        "`{element}` ({action}) moved by {moved:.4} instead of {expected:.4} along {axis}"
    )]
    PositionDriftDetected {
        element: String,
        action: String,
        axis: char,
        moved: f64,
        expected: f64,
    },
}

impl DeckstyleError {
    /// Create a new `Actions` error with the action file text.
    pub fn new_actions_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Actions {
            err,
            src: src.into(),
        }
    }

    /// Returns the parse error and its source text for diagnostic variants.
    pub fn parse_error(&self) -> Option<(&ParseError, &str)> {
        match self {
            Self::MalformedTransform { err, src, .. }
            | Self::MalformedPath { err, src, .. }
            | Self::Actions { err, src } => Some((err, src)),
            _ => None,
        }
    }
}
