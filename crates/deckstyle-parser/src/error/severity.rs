//! How seriously a diagnostic is taken.

use std::fmt;

/// An error stops the run before any output is written; a warning is logged
/// and the conversion carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    /// The level a diagnostic of this severity is logged at.
    pub fn log_level(&self) -> log::Level {
        match self {
            Severity::Error => log::Level::Error,
            Severity::Warning => log::Level::Warn,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_log_at_warn() {
        assert_eq!(Severity::Warning.log_level(), log::Level::Warn);
        assert_eq!(Severity::Error.log_level(), log::Level::Error);
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
