//! Elaboration of an action file into a typed [`ActionPlan`].
//!
//! The action file is a JSON object with two kinds of top-level entries,
//! told apart by the shape of their value:
//!
//! ```json
//! {
//!     "ace_spade": { "pip_1": ["M1", "D"], "pip_2": ["C1"] },
//!     "M1": [5, -3],
//!     "C1": [0, 10, 2, 2]
//! }
//! ```
//!
//! - an object is a card: element id → list of action references;
//! - an array is a parameter entry for the action reference used as its key.
//!
//! Every problem found in the file is collected before returning, so a
//! single run reports all of them. Parameter entries that no card uses are
//! reported as warnings and do not fail elaboration.

use std::collections::{HashMap, HashSet};

use log::{debug, log, trace};
use serde_json::{Map, Value};

use deckstyle_core::{
    action::{Action, ActionCode, ActionKind, ActionPlan, AdjustValue, CardActions, CopyParams},
    format,
    identifier::Id,
    style::STYLE_DIGITS,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

/// Elaborates a decoded action file.
///
/// `source` is the text the value was decoded from; it is only used to
/// point diagnostics at the offending entries.
///
/// # Examples
///
/// ```
/// # use deckstyle_parser::elaborate_actions;
/// # use deckstyle_core::identifier::Id;
/// let source = r#"{ "card": { "pip": ["M1"] }, "M1": [5, -3] }"#;
/// let value = serde_json::from_str(source).unwrap();
///
/// let plan = elaborate_actions(&value, source).unwrap();
/// assert_eq!(plan.action_count(), 1);
/// assert!(plan.card(Id::new("card")).is_some());
/// ```
pub fn elaborate_actions(value: &Value, source: &str) -> Result<ActionPlan, ParseError> {
    let (plan, warnings) = Elaborator::new(source).elaborate(value)?;
    for warning in &warnings {
        log!(warning.severity().log_level(), diagnostic:% = warning; "Action file warning");
    }
    Ok(plan)
}

struct Elaborator<'a> {
    source: &'a str,
    diagnostics: DiagnosticCollector,
    /// Parameter entries referenced by at least one card
    used: HashSet<String>,
}

impl<'a> Elaborator<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            diagnostics: DiagnosticCollector::new(),
            used: HashSet::new(),
        }
    }

    /// Returns the plan together with the warnings found along the way.
    fn elaborate(mut self, value: &Value) -> Result<(ActionPlan, Vec<Diagnostic>), ParseError> {
        let Value::Object(entries) = value else {
            return Err(Diagnostic::error("action file must be a JSON object")
                .with_code(ErrorCode::E204)
                .with_label(Span::new(0..self.source.len()), "expected an object")
                .into());
        };

        let mut cards = Vec::new();
        let mut parameters: HashMap<&str, Option<ActionKind>> = HashMap::new();

        for (key, entry) in entries {
            match entry {
                Value::Object(elements) => cards.push((key.as_str(), elements)),
                Value::Array(params) => {
                    let kind = self.parameter_entry(key, params);
                    parameters.insert(key.as_str(), kind);
                }
                _ => self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "entry `{key}` must be an object (card) or an array (parameters)"
                    ))
                    .with_code(ErrorCode::E204)
                    .with_label(self.key_span(key), "unexpected value"),
                ),
            }
        }
        debug!(
            cards = cards.len(),
            parameter_entries = parameters.len();
            "Classified action file entries"
        );

        let mut plan = ActionPlan::new();
        for (card, elements) in cards {
            let actions = self.card(elements, &parameters);
            plan.insert_card(Id::new(card), actions);
        }

        for (key, entry) in entries {
            let elaborated = matches!(parameters.get(key.as_str()), Some(Some(_)));
            if entry.is_array() && elaborated && !self.used.contains(key) {
                self.diagnostics.emit(
                    Diagnostic::warning(format!("parameter entry `{key}` is not used by any card"))
                        .with_label(self.key_span(key), "never referenced"),
                );
            }
        }

        let warnings = self.diagnostics.finish()?;
        trace!(plan:?; "Elaborated action plan");
        Ok((plan, warnings))
    }

    /// Elaborates the actions of one card.
    fn card(
        &mut self,
        elements: &Map<String, Value>,
        parameters: &HashMap<&str, Option<ActionKind>>,
    ) -> CardActions {
        let mut actions = CardActions::new();

        for (element, references) in elements {
            let Value::Array(references) = references else {
                self.diagnostics.emit(
                    Diagnostic::error(format!(
                        "actions for element `{element}` must be an array of action references"
                    ))
                    .with_code(ErrorCode::E204)
                    .with_label(self.key_span(element), "expected an array"),
                );
                continue;
            };

            let mut list = Vec::with_capacity(references.len());
            for reference in references {
                let Value::String(reference) = reference else {
                    self.diagnostics.emit(
                        Diagnostic::error(format!(
                            "action references of `{element}` must be strings, found `{reference}`"
                        ))
                        .with_code(ErrorCode::E204)
                        .with_label(self.key_span(element), "in this list"),
                    );
                    continue;
                };
                if let Some(action) = self.reference(reference, parameters) {
                    list.push(action);
                }
            }
            actions.entry(Id::new(element)).or_default().extend(list);
        }

        actions
    }

    /// Resolves one action reference used in a card.
    fn reference(
        &mut self,
        reference: &str,
        parameters: &HashMap<&str, Option<ActionKind>>,
    ) -> Option<Action> {
        let Some(code) = reference.chars().next().and_then(ActionCode::from_letter) else {
            self.diagnostics.emit(unknown_code(reference, self.value_span(reference)));
            return None;
        };

        if !code.takes_parameters() {
            return Some(Action::new(Id::new(reference), ActionKind::Delete));
        }

        if parameters.contains_key(reference) {
            self.used.insert(reference.to_string());
        }
        match parameters.get(reference) {
            // Already reported while elaborating the parameter entry.
            Some(None) => None,
            Some(Some(kind)) => Some(Action::new(Id::new(reference), kind.clone())),
            None => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("no parameters for action `{reference}`"))
                        .with_code(ErrorCode::E202)
                        .with_label(self.value_span(reference), "used here")
                        .with_help(format!("add an entry `\"{reference}\": [...]` to the action file")),
                );
                None
            }
        }
    }

    /// Elaborates one parameter entry. Returns `None` after reporting an
    /// error.
    fn parameter_entry(&mut self, key: &str, params: &[Value]) -> Option<ActionKind> {
        let span = self.key_span(key);
        let code = key
            .chars()
            .next()
            .and_then(ActionCode::from_letter)
            .filter(|code| code.takes_parameters());
        let Some(code) = code else {
            self.diagnostics.emit(unknown_code(key, span));
            return None;
        };

        let expected: &[usize] = match code {
            ActionCode::Copy => &[2, 4],
            ActionCode::Move | ActionCode::Substitute | ActionCode::Adjust | ActionCode::SetStyle => &[2],
            ActionCode::Isolate | ActionCode::SetClasses => &[1],
            ActionCode::Delete => &[0],
        };
        if !expected.contains(&params.len()) {
            let count = match expected {
                [n] => n.to_string(),
                _ => "2 or 4".to_string(),
            };
            self.diagnostics.emit(
                Diagnostic::error(format!(
                    "`{key}` ({code}) expects {count} parameters, found {}",
                    params.len()
                ))
                .with_code(ErrorCode::E201)
                .with_label(span, "wrong number of parameters"),
            );
            return None;
        }

        let kind = match code {
            ActionCode::Copy => {
                let numbers = self.numbers(key, params)?;
                match numbers[..] {
                    [dx, dy] => ActionKind::Copy(CopyParams::Translate { dx, dy }),
                    [dx, dy, sx, sy] => ActionKind::Copy(CopyParams::Scaled { dx, dy, sx, sy }),
                    _ => return None,
                }
            }
            ActionCode::Move => {
                let numbers = self.numbers(key, params)?;
                ActionKind::Move {
                    dx: numbers[0],
                    dy: numbers[1],
                }
            }
            ActionCode::Substitute => {
                let (attribute, value) = self.string_pair(key, params)?;
                ActionKind::Substitute { attribute, value }
            }
            ActionCode::Adjust => {
                let property = self.string(key, &params[0])?;
                let value = match &params[1] {
                    Value::String(text) if text.starts_with('*') => {
                        let factor = text[1..].trim().parse::<f64>().ok().filter(|f| f.is_finite());
                        let Some(factor) = factor else {
                            self.diagnostics.emit(invalid_parameter(
                                key,
                                &params[1],
                                "a multiplier `*k` with a numeric `k`",
                                span,
                            ));
                            return None;
                        };
                        AdjustValue::Multiply(factor)
                    }
                    other => AdjustValue::Literal(self.string(key, other)?),
                };
                ActionKind::Adjust { property, value }
            }
            ActionCode::Isolate => ActionKind::Isolate {
                classes: self.string(key, &params[0])?,
            },
            ActionCode::SetClasses => ActionKind::SetClasses {
                classes: self.string(key, &params[0])?,
            },
            ActionCode::SetStyle => {
                let (property, value) = self.string_pair(key, params)?;
                ActionKind::SetStyle { property, value }
            }
            ActionCode::Delete => ActionKind::Delete,
        };
        Some(kind)
    }

    fn numbers(&mut self, key: &str, params: &[Value]) -> Option<Vec<f64>> {
        let mut numbers = Vec::with_capacity(params.len());
        let mut valid = true;
        for param in params {
            match param.as_f64() {
                Some(number) => numbers.push(number),
                None => {
                    let span = self.key_span(key);
                    self.diagnostics
                        .emit(invalid_parameter(key, param, "a number", span));
                    valid = false;
                }
            }
        }
        valid.then_some(numbers)
    }

    /// Reads a string parameter. Numbers are accepted and formatted with
    /// three significant digits.
    fn string(&mut self, key: &str, param: &Value) -> Option<String> {
        match param {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => number
                .as_f64()
                .map(|n| format::significant(n, STYLE_DIGITS)),
            _ => {
                let span = self.key_span(key);
                self.diagnostics
                    .emit(invalid_parameter(key, param, "a string", span));
                None
            }
        }
    }

    fn string_pair(&mut self, key: &str, params: &[Value]) -> Option<(String, String)> {
        let first = self.string(key, &params[0]);
        let second = self.string(key, &params[1]);
        Some((first?, second?))
    }

    /// Span of `"key"` where it is used as an object key.
    fn key_span(&self, key: &str) -> Span {
        self.find_quoted(key, true)
    }

    /// Span of `"text"` where it is used as a value.
    fn value_span(&self, text: &str) -> Span {
        self.find_quoted(text, false)
    }

    fn find_quoted(&self, text: &str, as_key: bool) -> Span {
        let quoted = format!("\"{text}\"");
        let mut fallback = None;
        for (start, _) in self.source.match_indices(&quoted) {
            let end = start + quoted.len();
            let is_key = self.source[end..].trim_start().starts_with(':');
            if is_key == as_key {
                return Span::new(start..end);
            }
            fallback.get_or_insert(Span::new(start..end));
        }
        fallback.unwrap_or_default()
    }
}

fn unknown_code(reference: &str, span: Span) -> Diagnostic {
    let letter = reference.chars().next().map(String::from).unwrap_or_default();
    Diagnostic::error(format!("unknown action code `{letter}` in `{reference}`"))
        .with_code(ErrorCode::E200)
        .with_label(span, ErrorCode::E200.description())
        .with_help("action references start with one of D, C, M, S, A, I, L, T (parameter entries: not D)")
}

fn invalid_parameter(key: &str, param: &Value, expected: &str, span: Span) -> Diagnostic {
    Diagnostic::error(format!("invalid parameter `{param}` for `{key}`"))
        .with_code(ErrorCode::E203)
        .with_label(span, format!("expected {expected}"))
}
