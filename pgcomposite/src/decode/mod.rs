//! Field value decoding.
//!
//! - [`FieldDecoder`]
//! - [`Builtin`]
//! - [`ArrayDecoder`]
//! - [`DecodeError`]
use bytes::{Bytes, BytesMut};
use futures_core::future::LocalBoxFuture;

use crate::{
    Result,
    common::unit_error,
    frame::{FrameReader, FrameReaderExt},
    postgres::{Oid, ProtocolError},
    value::Value,
};

mod error;
mod builtin;
mod array;
#[cfg(feature = "json")]
mod json;
#[cfg(feature = "time")]
mod timestamp;

pub use error::DecodeError;
pub use builtin::Builtin;
pub use array::ArrayDecoder;

/// Category of a [`FieldDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderKind {
    /// Scalar type with fixed binary representation.
    Builtin,
    /// Array of another registered type.
    Array,
    /// Composite type, decoded into [`Record`][crate::Record].
    Composite,
}

/// Decoder of a single postgres type in binary format.
///
/// Decoders are registered in a [`Registry`][crate::Registry] by their
/// [`oid`][FieldDecoder::oid] and shared between every value of that type.
pub trait FieldDecoder: Send + Sync {
    fn kind(&self) -> DecoderKind;

    /// Oid of the decoded type.
    fn oid(&self) -> Oid;

    /// Postgres display name of the decoded type.
    fn type_name(&self) -> &str;

    /// Decode a value of exactly `len` bytes from `reader`.
    ///
    /// Caller already consumed the length prefix, and should not call this
    /// for `NULL` value.
    fn decode<'a>(
        &'a self,
        reader: &'a mut dyn FrameReader,
        len: usize,
    ) -> LocalBoxFuture<'a, Result<Value>>;

    /// Write the binary representation of `value`, without length prefix.
    fn encode(&self, value: &Value, buf: &mut BytesMut) -> Result<()>;
}

impl std::fmt::Debug for dyn FieldDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDecoder")
            .field("kind", &self.kind())
            .field("oid", &self.oid())
            .field("type_name", &self.type_name())
            .finish()
    }
}

unit_error! {
    /// An error when calling an operation that the decoder does not support.
    pub struct Unsupported("operation is not supported by this type decoder");
}

/// Wait for and split off a `len` bytes payload.
pub(crate) async fn read_payload(reader: &mut dyn FrameReader, len: usize) -> Result<Bytes> {
    reader.ensure(len).await?;
    Ok(reader.read_bytes(len))
}

/// Decode a nested value from exactly `len` bytes of `reader`.
///
/// A decoder that stops short of `len` is a [`ProtocolError`], a decoder that
/// reads past it fails with [`UnexpectedEof`][std::io::ErrorKind::UnexpectedEof].
pub(crate) async fn decode_field(
    decoder: &dyn FieldDecoder,
    reader: &mut dyn FrameReader,
    len: usize,
) -> Result<Value> {
    let mut payload = read_payload(reader, len).await?;
    let value = decoder.decode(&mut payload, len).await?;
    if !payload.is_empty() {
        return Err(ProtocolError::length_mismatch(len, len - payload.len()).into());
    }
    Ok(value)
}
