use thiserror::Error;

use crate::inputs::InputField;

/// Failure to turn an untrusted hex string into bytes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("invalid hex: {0}")]
    Decode(#[from] hex::FromHexError),

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Failure to build lock predicate inputs from a request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Missing required fields: {}", .0.iter().map(|f| f.wire_name()).collect::<Vec<_>>().join(", "))]
    MissingFields(Vec<InputField>),

    #[error("{} is not valid hex: {source}", .field.label())]
    InvalidHex {
        field: InputField,
        source: hex::FromHexError,
    },

    #[error("{} must be {expected} bytes, got {actual}", .field.label())]
    InvalidLength {
        field: InputField,
        expected: usize,
        actual: usize,
    },
}

impl InputError {
    /// Attach the offending field to a codec error.
    pub fn from_hex(field: InputField, err: HexError) -> Self {
        match err {
            HexError::Decode(source) => InputError::InvalidHex { field, source },
            HexError::Length { expected, actual } => InputError::InvalidLength {
                field,
                expected,
                actual,
            },
        }
    }

    /// The single field this error is about, if any.
    pub fn field(&self) -> Option<InputField> {
        match self {
            InputError::MissingFields(_) => None,
            InputError::InvalidHex { field, .. } | InputError::InvalidLength { field, .. } => {
                Some(*field)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, InputError>;
