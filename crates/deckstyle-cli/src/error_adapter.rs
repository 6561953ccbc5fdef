//! Error adapter for converting DeckstyleError to miette diagnostics.
//!
//! Bridges the library's error types and miette's report rendering.
//!
//! # Multi-Error Support
//!
//! An action file can fail with several diagnostics at once; each one is
//! rendered independently. Transform and path errors are rendered against the
//! attribute text that failed to parse.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use deckstyle::DeckstyleError;
use deckstyle_parser::error::Diagnostic;

/// Adapter for a single parser diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Text the diagnostic's spans point into
    src: &'a str,
    /// Element whose attribute failed to parse, if any
    element: Option<&'a str>,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self {
            diag,
            src,
            element: None,
        }
    }

    /// Names the element whose attribute `src` was read from.
    pub fn with_element(mut self, element: &'a str) -> Self {
        self.element = Some(element);
        self
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .field("element", &self.element)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.element {
            Some(element) => write!(f, "{} (on `{element}`)", self.diag.message()),
            None => write!(f, "{}", self.diag.message()),
        }
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        if self.diag.severity().is_warning() {
            Some(miette::Severity::Warning)
        } else {
            Some(miette::Severity::Error)
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for [`DeckstyleError`] variants without parser diagnostics.
pub struct ErrorAdapter<'a>(pub &'a DeckstyleError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            DeckstyleError::Io(_) => "deckstyle::io",
            DeckstyleError::Xml(_) => "deckstyle::xml",
            DeckstyleError::Json(_) => "deckstyle::json",
            DeckstyleError::Config(_) => "deckstyle::config",
            DeckstyleError::MalformedTransform { .. }
            | DeckstyleError::MalformedPath { .. }
            | DeckstyleError::Actions { .. } => return None,
            DeckstyleError::UnresolvedReference { .. } => "deckstyle::unresolved_reference",
            DeckstyleError::CyclicReference { .. } => "deckstyle::cyclic_reference",
            DeckstyleError::UnknownElement { .. } => "deckstyle::unknown_element",
            DeckstyleError::UnsupportedElement { .. } => "deckstyle::unsupported_element",
            DeckstyleError::InvalidAttribute { .. } => "deckstyle::invalid_attribute",
            DeckstyleError::MissingStyleProperty { .. } => "deckstyle::missing_style_property",
            DeckstyleError::InvalidStyleValue { .. } => "deckstyle::invalid_style_value",
            DeckstyleError::MissingTarget { .. } => "deckstyle::missing_target",
            DeckstyleError::PositionDriftDetected { .. } => "deckstyle::position_drift",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            DeckstyleError::MissingTarget { .. } => {
                "set `edit.missing_target` to \"warn\" to skip such actions"
            }
            DeckstyleError::CyclicReference { .. } => {
                "`use` chains must end at a real element within `edit.max_reference_depth` steps"
            }
            DeckstyleError::Config(_) => "pass a valid TOML file with `--config`, or omit it to use defaults",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

fn span_to_miette(span: deckstyle_parser::Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`DeckstyleError`] into a list of reportable errors.
///
/// Errors carrying a [`ParseError`](deckstyle_parser::ParseError) produce one
/// [`Reportable`] per diagnostic; every other variant produces one.
pub fn to_reportables(err: &DeckstyleError) -> Vec<Reportable<'_>> {
    let element = match err {
        DeckstyleError::MalformedTransform { element, .. }
        | DeckstyleError::MalformedPath { element, .. } => Some(element.as_str()),
        _ => None,
    };

    match err.parse_error() {
        Some((parse_err, src)) => parse_err
            .diagnostics()
            .iter()
            .map(|d| {
                let adapter = DiagnosticAdapter::new(d, src);
                Reportable::Diagnostic(match element {
                    Some(element) => adapter.with_element(element),
                    None => adapter,
                })
            })
            .collect(),
        None => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use deckstyle_parser::{
        ParseError, Span,
        error::{Diagnostic, ErrorCode},
        parse_path,
    };

    use super::*;

    #[test]
    fn test_action_diagnostics_are_separate() {
        let diags = vec![
            Diagnostic::error("unknown action code `X`")
                .with_code(ErrorCode::E200)
                .with_label(Span::new(0..2), "here"),
            Diagnostic::error("`M1` (move) expects 2 parameters, found 3")
                .with_code(ErrorCode::E201)
                .with_label(Span::new(5..7), "M1")
                .with_help("pass `[dx, dy]`"),
        ];
        let err = DeckstyleError::new_actions_error(ParseError::from(diags), "X1 M1 ...");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "unknown action code `X`");
        assert_eq!(
            reportables[1].code().map(|c| c.to_string()),
            Some("E201".to_string())
        );
        assert_eq!(
            reportables[1].help().map(|h| h.to_string()),
            Some("pass `[dx, dy]`".to_string())
        );
    }

    #[test]
    fn test_path_diagnostic_names_element() {
        let src = "M0,0 Q1,1 2,2";
        let err = DeckstyleError::MalformedPath {
            element: "pip".to_string(),
            err: ParseError::from(parse_path(src).find_map(Result::err).unwrap()),
            src: src.to_string(),
        };

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert!(d.to_string().ends_with("(on `pip`)"), "{d}");
                assert!(d.labels().is_some());
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_non_parse_error() {
        let err = DeckstyleError::MissingTarget {
            card: "ace".to_string(),
            element: "pip".to_string(),
            action: "D".to_string(),
        };

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(
                    e.code().map(|c| c.to_string()),
                    Some("deckstyle::missing_target".to_string())
                );
                assert!(e.help().is_some());
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_unused_entry_renders_as_warning() {
        let source = r#"{"c": {"e": ["X"]}, "M2": [2, 2]}"#;
        let err = deckstyle::StyleConverter::default()
            .parse_actions(source)
            .unwrap_err();

        let severities: Vec<_> = to_reportables(&err)
            .iter()
            .map(|r| r.severity())
            .collect();
        assert_eq!(
            severities,
            [Some(miette::Severity::Error), Some(miette::Severity::Warning)]
        );
    }

    #[test]
    fn test_config_error_code() {
        let err = DeckstyleError::Config("Missing configuration file: absent.toml".to_string());

        let reportables = to_reportables(&err);
        assert_eq!(
            reportables[0].code().map(|c| c.to_string()),
            Some("deckstyle::config".to_string())
        );
        assert!(reportables[0].help().is_some());
    }

    #[test]
    fn test_primary_flag_on_labels() {
        let diag = Diagnostic::error("chained transforms are not supported")
            .with_label(Span::new(14..23), "second transform")
            .with_secondary_label(Span::new(0..14), "first transform");

        let adapter = DiagnosticAdapter::new(&diag, "translate(1,2) scale(2)");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
    }
}
