use std::{fmt, str::Utf8Error, string::FromUtf8Error};

use crate::postgres::Oid;

/// An error when decoding or encoding a field value.
pub enum DecodeError {
    /// Postgres return non utf8 string.
    Utf8(Utf8Error),
    /// Fixed width value with unexpected length.
    InvalidLength {
        oid: Oid,
        expected: usize,
        actual: usize,
    },
    /// Value given to encode does not match decoder type.
    TypeMismatch {
        expected: &'static str,
    },
    /// Array with more than one dimension.
    ArrayDimension(i32),
    /// Unknown `jsonb` binary version.
    JsonbVersion(u8),
    /// Failed to deserialize using `serde_json`.
    #[cfg(feature = "json")]
    Json(serde_json::error::Error),
}

impl std::error::Error for DecodeError { }

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to decode value, ")?;
        match self {
            Self::Utf8(e) => write!(f, "{e}"),
            Self::InvalidLength { oid, expected, actual } => write!(
                f,
                "type oid {oid} expect {expected} bytes, found {actual}"
            ),
            Self::TypeMismatch { expected } => write!(f, "expected `{expected}` value"),
            Self::ArrayDimension(n) => write!(f, "unsupported array dimension: {n}"),
            Self::JsonbVersion(v) => write!(f, "unsupported jsonb version: {v}"),
            #[cfg(feature = "json")]
            Self::Json(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for DecodeError {
            fn from($pat: $ty) -> Self {
                $body
            }
        }
    };
}

from!(<Utf8Error>e => Self::Utf8(e));
from!(<FromUtf8Error>e => Self::Utf8(e.utf8_error()));
#[cfg(feature = "json")]
from!(<serde_json::error::Error>e => Self::Json(e));
