//! Dynamic composite type decoding.
//!
//! <https://www.postgresql.org/docs/current/rowtypes.html>
//!
//! Binary layout:
//!
//! ```text
//! int32        field count
//! repeat field count times:
//!   int32      field type oid
//!   int32      field length, -1 for null
//!   byte[len]  field value
//! ```
//!
//! A [`CompositeDecoder`] is created with only the catalog metadata of its
//! type. Field types are bound to their decoders on the first decode, which
//! allow composite types to be registered in any order regardless of their
//! dependencies.
use bytes::BytesMut;
use futures_core::future::LocalBoxFuture;
use std::sync::{Arc, OnceLock, Weak};

use crate::{
    Result,
    common::{ByteStr, span, verbose},
    decode::{DecoderKind, FieldDecoder, Unsupported, decode_field},
    frame::{FrameReader, FrameReaderExt},
    postgres::{NULL_LEN, Oid, ProtocolError},
    record::Record,
    registry::Registry,
    value::Value,
};

mod descriptor;
mod error;

pub use descriptor::{CompositeField, CompositeType};
pub use error::{RegistryClosed, UnknownFieldType};

/// A composite field bound to its decoder.
#[derive(Debug, Clone)]
pub struct FieldBinding {
    name: ByteStr,
    decoder: Arc<dyn FieldDecoder>,
}

impl FieldBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decoder(&self) -> &Arc<dyn FieldDecoder> {
        &self.decoder
    }
}

/// Field binding state of a [`CompositeDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Unresolved,
    Resolved,
}

/// Decoder for composite type into [`Record`].
///
/// Wire field type oid is not checked against the declared field type,
/// fields are trusted to arrive in declaration order.
pub struct CompositeDecoder {
    descriptor: Arc<CompositeType>,
    registry: Weak<dyn Registry>,
    fields: OnceLock<Box<[FieldBinding]>>,
}

impl CompositeDecoder {
    pub fn descriptor(&self) -> &Arc<CompositeType> {
        &self.descriptor
    }

    pub fn state(&self) -> ResolveState {
        match self.fields.get() {
            Some(_) => ResolveState::Resolved,
            None => ResolveState::Unresolved,
        }
    }

    /// Bind every field to its registered decoder.
    ///
    /// Does nothing if already resolved. On failure nothing is kept, and the
    /// next call will query the registry again.
    pub fn resolve(&self) -> Result<&[FieldBinding]> {
        if let Some(fields) = self.fields.get() {
            return Ok(fields);
        }

        span!("resolve", composite = %self.descriptor.name());

        let registry = self.registry.upgrade().ok_or(RegistryClosed)?;

        let fields = self
            .descriptor
            .fields()
            .iter()
            .map(|field| match registry.lookup(field.oid()) {
                Some(decoder) => Ok(FieldBinding { name: field.name().clone(), decoder }),
                None => Err(UnknownFieldType::new(
                    self.descriptor.name().clone(),
                    field.name().clone(),
                    field.oid(),
                )),
            })
            .collect::<Result<Box<[_]>, _>>()?;

        verbose!(fields = fields.len(), "composite resolved");

        Ok(self.fields.get_or_init(|| fields))
    }

    /// Decode a composite value.
    ///
    /// On error, the reader may be left in the middle of the value.
    pub async fn decode_record(&self, reader: &mut dyn FrameReader, len: usize) -> Result<Record> {
        let fields = self.resolve()?;

        verbose!(composite = %self.descriptor.name(), len, "decode composite");
        #[cfg(not(feature = "verbose"))]
        let _ = len;

        reader.ensure(4).await?;
        let count = reader.read_i32();
        if usize::try_from(count).ok() != Some(fields.len()) {
            return Err(ProtocolError::field_count(
                self.descriptor.name().clone(),
                fields.len(),
                count,
            )
            .into());
        }

        let mut record = Record::with_capacity(fields.len());

        for field in fields {
            reader.ensure(8).await?;
            let _oid = reader.read_u32();
            let len = reader.read_i32();

            if len == NULL_LEN {
                continue;
            }

            let len = usize::try_from(len).map_err(|_| ProtocolError::invalid_length(len))?;
            let value = decode_field(&*field.decoder, &mut *reader, len).await?;
            record.push(field.name.clone(), value);
        }

        Ok(record)
    }
}

impl FieldDecoder for CompositeDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::Composite
    }

    fn oid(&self) -> Oid {
        self.descriptor.oid()
    }

    fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    fn decode<'a>(
        &'a self,
        reader: &'a mut dyn FrameReader,
        len: usize,
    ) -> LocalBoxFuture<'a, Result<Value>> {
        Box::pin(async move { self.decode_record(reader, len).await.map(Value::Record) })
    }

    /// Always returns [`Unsupported`].
    fn encode(&self, _: &Value, _: &mut BytesMut) -> Result<()> {
        Err(Unsupported.into())
    }
}

impl std::fmt::Debug for CompositeDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeDecoder")
            .field("descriptor", &self.descriptor)
            .field("state", &self.state())
            .finish()
    }
}

/// Creates [`CompositeDecoder`] bound to a registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeDecoderFactory;

impl CompositeDecoderFactory {
    /// Create an unresolved decoder.
    ///
    /// The decoder only hold a weak reference to `registry`.
    pub fn create<R: Registry + 'static>(
        registry: &Arc<R>,
        descriptor: Arc<CompositeType>,
    ) -> CompositeDecoder {
        let registry: Weak<R> = Arc::downgrade(registry);
        CompositeDecoder {
            descriptor,
            registry,
            fields: OnceLock::new(),
        }
    }
}
