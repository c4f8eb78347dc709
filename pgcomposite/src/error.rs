//! `pgcomposite` error types.
use std::{backtrace::Backtrace, fmt, io};

use crate::{
    composite::{RegistryClosed, UnknownFieldType},
    decode::{DecodeError, Unsupported},
    postgres::ProtocolError,
};

/// A specialized [`Result`] type for `pgcomposite` operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible error from `pgcomposite` library.
pub struct Error {
    context: String,
    backtrace: Backtrace,
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Prefix the error message with `context`.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

/// All possible error kind from `pgcomposite` library.
pub enum ErrorKind {
    /// Error from the underlying reader.
    Io(io::Error),
    /// Value does not follow the binary format.
    Protocol(ProtocolError),
    /// Composite field type is not in the registry.
    UnknownFieldType(UnknownFieldType),
    /// Registry that a decoder were created against is dropped.
    RegistryClosed(RegistryClosed),
    /// Operation is not supported by the decoder.
    Unsupported(Unsupported),
    /// Field payload cannot be decoded.
    Decode(DecodeError),
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for Error {
            fn from($pat: $ty) -> Self {
                let backtrace = std::backtrace::Backtrace::capture();
                Self { context: String::new(), backtrace, kind: $body }
            }
        }
    };
}

from!(<ErrorKind>e => e);
from!(<io::Error>e => ErrorKind::Io(e));
from!(<ProtocolError>e => ErrorKind::Protocol(e));
from!(<UnknownFieldType>e => ErrorKind::UnknownFieldType(e));
from!(<RegistryClosed>e => ErrorKind::RegistryClosed(e));
from!(<Unsupported>e => ErrorKind::Unsupported(e));
from!(<DecodeError>e => ErrorKind::Decode(e));

impl std::error::Error for Error { }

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.context.is_empty() {
            write!(f, "{}: ", self.context)?;
        }

        fmt::Display::fmt(&self.kind, f)?;

        if let std::backtrace::BacktraceStatus::Captured = self.backtrace.status() {
            let mut backtrace = self.backtrace.to_string();
            write!(f, "\n\n")?;
            writeln!(f, "Stack backtrace:")?;
            backtrace.truncate(backtrace.trim_end().len());
            write!(f, "{}", backtrace)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for ErrorKind { }

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => e.fmt(f),
            Self::Protocol(e) => e.fmt(f),
            Self::UnknownFieldType(e) => e.fmt(f),
            Self::RegistryClosed(e) => e.fmt(f),
            Self::Unsupported(e) => e.fmt(f),
            Self::Decode(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
