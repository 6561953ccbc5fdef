//! Number formatting for emitted attribute values.
//!
//! Positions written into `transform` attributes use four decimal places,
//! style values use three significant digits, and linear matrix entries that
//! are carried over unchanged use the shortest exact representation.

/// Formats a coordinate with four decimal places.
///
/// Negative zero (including values that round to zero) is written as
/// `0.0000`.
///
/// # Examples
///
/// ```
/// # use deckstyle_core::format::fixed;
/// assert_eq!(fixed(5.0), "5.0000");
/// assert_eq!(fixed(-3.0), "-3.0000");
/// assert_eq!(fixed(-0.00001), "0.0000");
/// ```
pub fn fixed(value: f64) -> String {
    let formatted = format!("{value:.4}");
    match formatted.strip_prefix('-') {
        Some(unsigned) if unsigned.chars().all(|c| c == '0' || c == '.') => unsigned.to_string(),
        _ => formatted,
    }
}

/// Formats a number with the shortest representation that parses back to the
/// same value.
///
/// # Examples
///
/// ```
/// # use deckstyle_core::format::shortest;
/// assert_eq!(shortest(1.0), "1");
/// assert_eq!(shortest(0.5), "0.5");
/// assert_eq!(shortest(-0.0), "0");
/// ```
pub fn shortest(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Formats a number with `digits` significant digits, in the style of C's
/// `%g`: fixed notation for moderate exponents, scientific notation
/// otherwise, trailing zeros removed.
///
/// # Examples
///
/// ```
/// # use deckstyle_core::format::significant;
/// assert_eq!(significant(2.5, 3), "2.5");
/// assert_eq!(significant(0.123456, 3), "0.123");
/// assert_eq!(significant(1234.5, 3), "1.23e+03");
/// assert_eq!(significant(0.0000123, 3), "1.23e-05");
/// assert_eq!(significant(100.0, 3), "100");
/// ```
pub fn significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let digits = digits.max(1);

    // Rounding to the requested precision can bump the exponent (9.996 -> 1.00e1),
    // so the exponent is read back from the rounded scientific form.
    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if exponent < -4 || exponent >= digits as i32 {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

/// Removes trailing zeros of a fractional part, and the dot if nothing is left.
fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
