//! Collector for accumulating diagnostics during a parsing pass.
//!
//! The [`DiagnosticCollector`] lets the action-list elaborator report every
//! bad entry of a file at once instead of failing on the first one.

use crate::error::{Diagnostic, ParseError};

#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Finishes collection.
    ///
    /// Fails with every diagnostic when any of them is an error; otherwise
    /// hands back the warnings for the caller to report.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}
