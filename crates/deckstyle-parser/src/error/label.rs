//! Spans of the parsed text that a diagnostic points at.

use crate::span::Span;

/// Whether a label marks the offending text or only related context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    /// The fragment that failed, such as the second function of a chained
    /// `transform` value.
    Primary,
    /// Context for the failure, such as the transform function that parsed
    /// fine before it.
    Secondary,
}

/// A message attached to a span of a `transform` value, a path's `d` data or
/// the action file.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    role: LabelRole,
}

impl Label {
    pub fn new(role: LabelRole, span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            role,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn role(&self) -> LabelRole {
        self.role
    }

    pub fn is_primary(&self) -> bool {
        self.role == LabelRole::Primary
    }
}
