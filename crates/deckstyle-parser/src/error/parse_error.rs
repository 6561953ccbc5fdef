//! The error every parser in this crate returns.

use std::fmt;

use crate::error::Diagnostic;

/// One or more diagnostics produced while reading a `transform` value, a
/// path's `d` data or an action file.
///
/// Warnings collected alongside the errors are kept, so a report can show
/// everything found in one pass.
#[derive(Debug, Clone)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Every diagnostic, in the order it was found.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics of error severity only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity().is_error())
    }
}

/// Shows the first error and how many further errors were found.
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = self.errors();
        let Some(first) = errors.next().or_else(|| self.diagnostics.first()) else {
            return Ok(());
        };
        write!(f, "{first}")?;
        let more = errors.count();
        if more > 0 {
            write!(f, " (+{more} more)")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_single_diagnostic() {
        let err: ParseError = Diagnostic::error("bad transform")
            .with_code(ErrorCode::E100)
            .into();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.to_string(), "error[E100]: bad transform");
    }

    #[test]
    fn test_display_counts_errors_only() {
        let err: ParseError = vec![
            Diagnostic::warning("parameter entry `M9` is not used by any card"),
            Diagnostic::error("first error"),
            Diagnostic::error("second error"),
            Diagnostic::warning("parameter entry `L2` is not used by any card"),
        ]
        .into();

        assert_eq!(err.errors().count(), 2);
        assert_eq!(err.to_string(), "error: first error (+1 more)");
    }
}
