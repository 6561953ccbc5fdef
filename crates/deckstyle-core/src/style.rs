//! Inline `style` attribute declarations.
//!
//! A style is an ordered list of `property:value` pairs separated by `;`.
//! Declaration order is kept so that rewriting one property leaves the rest
//! of the attribute as it was.

use std::fmt;

use thiserror::Error;

use crate::format;

/// Significant digits used when a style value is computed.
pub const STYLE_DIGITS: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum StyleError {
    #[error("style property `{0}` is not set")]
    MissingProperty(String),

    #[error("style property `{property}` has non-numeric value `{value}`")]
    NotNumeric { property: String, value: String },
}

/// Ordered style declarations.
///
/// # Examples
///
/// ```
/// # use deckstyle_core::style::Style;
/// let mut style = Style::parse("fill:#ff0000;stroke-width:1.5px");
/// assert_eq!(style.get("fill"), Some("#ff0000"));
///
/// style.multiply("stroke-width", 2.0).unwrap();
/// style.set("opacity", "0.5");
/// assert_eq!(style.to_string(), "fill:#ff0000;stroke-width:3px;opacity:0.5");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    /// Parses a `style` attribute. Empty and colon-less fragments are dropped.
    pub fn parse(text: &str) -> Self {
        let declarations = text
            .split(';')
            .filter_map(|fragment| {
                let (property, value) = fragment.split_once(':')?;
                let property = property.trim();
                if property.is_empty() {
                    return None;
                }
                Some((property.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { declarations }
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Returns the value of `property`, if declared.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    /// Sets `property`, appending it when it is not declared yet.
    pub fn set(&mut self, property: &str, value: &str) {
        match self.declarations.iter_mut().find(|(name, _)| name == property) {
            Some((_, current)) => *current = value.to_string(),
            None => self
                .declarations
                .push((property.to_string(), value.to_string())),
        }
    }

    /// Replaces the value of an existing property.
    pub fn replace(&mut self, property: &str, value: &str) -> Result<(), StyleError> {
        let (_, current) = self
            .declarations
            .iter_mut()
            .find(|(name, _)| name == property)
            .ok_or_else(|| StyleError::MissingProperty(property.to_string()))?;
        *current = value.to_string();
        Ok(())
    }

    /// Multiplies the numeric part of an existing property by `factor`,
    /// keeping any unit suffix, and returns the new value.
    pub fn multiply(&mut self, property: &str, factor: f64) -> Result<String, StyleError> {
        let current = self
            .get(property)
            .ok_or_else(|| StyleError::MissingProperty(property.to_string()))?;
        let (number, unit) = split_number(current).ok_or_else(|| StyleError::NotNumeric {
            property: property.to_string(),
            value: current.to_string(),
        })?;
        let value = format!("{}{unit}", format::significant(number * factor, STYLE_DIGITS));
        self.replace(property, &value)?;
        Ok(value)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (property, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{property}:{value}")?;
        }
        Ok(())
    }
}

/// Splits a value such as `1.5px` or `1e-3px` into its leading number and
/// unit suffix.
///
/// An `e` only starts an exponent when digits follow it, so `2em` keeps its
/// unit.
fn split_number(value: &str) -> Option<(f64, &str)> {
    let bytes = value.as_bytes();
    let signed = |i: usize| matches!(bytes.get(i), Some(b'-' | b'+'));
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(|b| b.is_ascii_digit() || *b == b'.') {
            i += 1;
        }
        i
    };

    let mut end = digits_from(usize::from(signed(0)));
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exponent = end + 1 + usize::from(signed(end + 1));
        if bytes.get(exponent).is_some_and(u8::is_ascii_digit) {
            end = exponent;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
        }
    }

    let number = value[..end].parse().ok()?;
    Some((number, value[end..].trim()))
}
