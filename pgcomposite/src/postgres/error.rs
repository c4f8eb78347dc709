//! Protocol error
use std::fmt;

use crate::common::ByteStr;

/// An error when the binary value does not follow the expected layout.
///
/// The position in the value is unknown after this error, the surrounding
/// message stream should be considered desynchronized.
pub enum ProtocolError {
    /// Composite value field count differ from catalog metadata.
    FieldCountMismatch {
        type_name: ByteStr,
        expected: usize,
        actual: i32,
    },
    /// Length prefix is negative, but not the `NULL` sentinel.
    InvalidLength {
        len: i32,
    },
    /// Field decoder did not consume the whole length prefixed payload.
    LengthMismatch {
        declared: usize,
        consumed: usize,
    },
}

impl std::error::Error for ProtocolError { }

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::FieldCountMismatch { type_name, expected, actual } => write!(
                f,
                "pg_attribute contains {expected} rows for type {type_name}, \
                but {actual} fields were received"
            ),
            ProtocolError::InvalidLength { len } => write!(f, "invalid value length: {len}"),
            ProtocolError::LengthMismatch { declared, consumed } => write!(
                f,
                "value length is {declared} bytes, but only {consumed} bytes were decoded"
            ),
        }
    }
}

impl fmt::Debug for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl ProtocolError {
    pub(crate) fn field_count(type_name: ByteStr, expected: usize, actual: i32) -> ProtocolError {
        Self::FieldCountMismatch { type_name, expected, actual }
    }

    pub(crate) fn invalid_length(len: i32) -> ProtocolError {
        Self::InvalidLength { len }
    }

    pub(crate) fn length_mismatch(declared: usize, consumed: usize) -> ProtocolError {
        Self::LengthMismatch { declared, consumed }
    }
}
