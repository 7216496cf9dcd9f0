use std::num::ParseFloatError;
use std::num::ParseIntError;

use thiserror::Error;

/// The result type that uses [`ParseError`] as the error type.
pub type Result<T> = std::result::Result<T, ParseError>;

/// The error type for extracting analytics data from a page.
///
/// Errors originate from locating the inline-data assignment in the page scripts,
/// splitting its bracketed array syntax into tuples and casting the tuple fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The inline-data variable could not be found in any script block.
    #[error("parse error: the \"{name}\" variable could not be found")]
    VariableNotFound { name: String },

    /// The assignment was found, but the statement terminator is missing.
    #[error("parse error: the \"{name}\" assignment is not terminated")]
    Unterminated { name: String },

    /// The assigned value is not a bracketed array.
    #[error("parse error: the \"{name}\" value is not a bracketed array: {reason}")]
    MalformedArray { name: String, reason: String },

    /// A tuple does not hold the expected number of positional fields.
    #[error("parse error: record {record} has {found} fields, expected {expected}")]
    FieldCount {
        record: usize,
        found: usize,
        expected: usize,
    },

    /// A positional field could not be cast to its declared type.
    #[error("parse error: record {record}, field {field}: cannot read \"{value}\": {reason}")]
    Field {
        record: usize,
        field: usize,
        value: String,
        reason: FieldError,
    },

    /// A CSS selector used to locate a page fragment is invalid.
    #[error("parse error: invalid selector \"{selector}\": {reason}")]
    Selector { selector: String, reason: String },
}

/// The reason a single tuple field failed to cast.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{0}")]
    Int(#[from] ParseIntError),

    #[error("{0}")]
    Float(#[from] ParseFloatError),

    #[error("unknown metric type")]
    UnknownType,

    #[error("period is neither a year nor \"all\"")]
    Period,
}

pub(crate) trait FieldResultExt<T> {
    fn map_field_err(self, record: usize, field: usize, value: &str) -> Result<T>;
}

impl<T, E> FieldResultExt<T> for std::result::Result<T, E>
where
    E: Into<FieldError>,
{
    fn map_field_err(self, record: usize, field: usize, value: &str) -> Result<T> {
        self.map_err(|error| ParseError::Field {
            record,
            field,
            value: value.to_owned(),
            reason: error.into(),
        })
    }
}
