//! Error codes for the deckstyle diagnostic system.
//!
//! Error codes are organized by input:
//! - `E1xx` - Geometry attribute errors (`transform`, path `d`)
//! - `E2xx` - Action list errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Geometry Attribute Errors (E1xx)
    // =========================================================================
    /// Malformed transform.
    ///
    /// The attribute is not exactly one `translate`, `matrix` or `scale`
    /// function with the right number of numeric arguments.
    E100,

    /// Chained transforms.
    ///
    /// More than one transform function was given in a single attribute.
    E101,

    /// Invalid number in path data.
    E102,

    /// Unsupported path command.
    ///
    /// Only `M`, `L`, `H`, `V`, `Z`, `C` and `A` (in either case) are
    /// understood.
    E103,

    /// Missing path operands.
    ///
    /// The path data ended, or the next command started, before the current
    /// command received all of its coordinates.
    E104,

    // =========================================================================
    // Action List Errors (E2xx)
    // =========================================================================
    /// Unknown action code.
    ///
    /// The leading letter of an action reference does not name an action.
    E200,

    /// Invalid action arity.
    ///
    /// The parameter list has the wrong number of entries for its action.
    E201,

    /// Missing action parameters.
    ///
    /// An action reference used by a card has no entry in the parameter table.
    E202,

    /// Invalid action parameter.
    ///
    /// A parameter has the wrong type, e.g. a string where a number is needed.
    E203,

    /// Malformed action list.
    ///
    /// The action file does not have the expected shape.
    E204,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Geometry attribute errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            // Action list errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Geometry attribute errors
            ErrorCode::E100 => "malformed transform",
            ErrorCode::E101 => "chained transforms",
            ErrorCode::E102 => "invalid number",
            ErrorCode::E103 => "unsupported path command",
            ErrorCode::E104 => "missing path operands",
            // Action list errors
            ErrorCode::E200 => "unknown action code",
            ErrorCode::E201 => "invalid action arity",
            ErrorCode::E202 => "missing action parameters",
            ErrorCode::E203 => "invalid action parameter",
            ErrorCode::E204 => "malformed action list",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
