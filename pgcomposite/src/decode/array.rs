use bytes::{BufMut, BytesMut};
use futures_core::future::LocalBoxFuture;
use std::sync::{Arc, OnceLock, Weak};

use super::{DecodeError, DecoderKind, FieldDecoder, decode_field};
use crate::{
    Result,
    common::{ByteStr, verbose},
    composite::{RegistryClosed, UnknownFieldType},
    ext::UsizeExt,
    frame::{FrameReader, FrameReaderExt},
    postgres::{NULL_LEN, Oid, ProtocolError},
    registry::Registry,
    value::Value,
};

/// Decoder for one dimensional arrays.
///
/// Binary layout:
///
/// ```text
/// int32   ndim
/// int32   has null flag
/// int32   element oid
/// repeat ndim times:
///   int32 dimension length
///   int32 lower bound
/// repeat product of dimension lengths times:
///   int32 element length, -1 for null
///   byte[len]
/// ```
///
/// Like composite fields, the element decoder is looked up in the registry
/// on first use.
pub struct ArrayDecoder {
    oid: Oid,
    name: ByteStr,
    element: Oid,
    registry: Weak<dyn Registry>,
    resolved: OnceLock<Arc<dyn FieldDecoder>>,
}

impl ArrayDecoder {
    pub fn new<R: Registry + 'static>(
        oid: Oid,
        name: impl Into<ByteStr>,
        element: Oid,
        registry: &Arc<R>,
    ) -> Self {
        let registry: Weak<R> = Arc::downgrade(registry);
        Self {
            oid,
            name: name.into(),
            element,
            registry,
            resolved: OnceLock::new(),
        }
    }

    /// Oid of the array element type.
    pub fn element(&self) -> Oid {
        self.element
    }

    fn resolve(&self) -> Result<&Arc<dyn FieldDecoder>> {
        if let Some(element) = self.resolved.get() {
            return Ok(element);
        }
        let registry = self.registry.upgrade().ok_or(RegistryClosed)?;
        let Some(element) = registry.lookup(self.element) else {
            return Err(UnknownFieldType::new(
                self.name.clone(),
                ByteStr::from_static("element"),
                self.element,
            )
            .into());
        };
        verbose!(array = %self.name, element = element.type_name(), "array resolved");
        Ok(self.resolved.get_or_init(|| element))
    }

    async fn decode_array(&self, reader: &mut dyn FrameReader) -> Result<Vec<Option<Value>>> {
        let element = self.resolve()?;

        reader.ensure(12).await?;
        let ndim = reader.read_i32();
        let _has_null = reader.read_i32();
        let _element_oid = reader.read_u32();

        let len = match ndim {
            0 => return Ok(Vec::new()),
            1 => {
                reader.ensure(8).await?;
                let len = reader.read_i32();
                let _lower_bound = reader.read_i32();
                usize::try_from(len).map_err(|_| ProtocolError::invalid_length(len))?
            }
            n => return Err(DecodeError::ArrayDimension(n).into()),
        };

        // every element carries at least its length prefix
        let mut values = Vec::with_capacity(len.min(reader.remaining() / 4));
        for _ in 0..len {
            reader.ensure(4).await?;
            let len = reader.read_i32();
            if len == NULL_LEN {
                values.push(None);
                continue;
            }
            let len = usize::try_from(len).map_err(|_| ProtocolError::invalid_length(len))?;
            values.push(Some(decode_field(&**element, &mut *reader, len).await?));
        }

        Ok(values)
    }
}

impl FieldDecoder for ArrayDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::Array
    }

    fn oid(&self) -> Oid {
        self.oid
    }

    fn type_name(&self) -> &str {
        &self.name
    }

    fn decode<'a>(
        &'a self,
        reader: &'a mut dyn FrameReader,
        _: usize,
    ) -> LocalBoxFuture<'a, Result<Value>> {
        Box::pin(async move { self.decode_array(reader).await.map(Value::Array) })
    }

    fn encode(&self, value: &Value, buf: &mut BytesMut) -> Result<()> {
        let Value::Array(values) = value else {
            return Err(DecodeError::TypeMismatch { expected: "array" }.into());
        };
        let element = self.resolve()?;

        buf.put_i32(1);
        buf.put_i32(values.iter().any(Option::is_none) as i32);
        buf.put_u32(self.element);
        buf.put_i32(values.len().to_i32());
        buf.put_i32(1);

        for value in values {
            let Some(value) = value else {
                buf.put_i32(NULL_LEN);
                continue;
            };
            let offset = buf.len();
            buf.put_i32(0);
            element.encode(value, buf)?;
            let size = (buf.len() - offset - 4).to_i32();
            buf[offset..offset + 4].copy_from_slice(&size.to_be_bytes());
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use bytes::Bytes;

    use super::*;
    use crate::{TypeRegistry, postgres::oid};

    fn int4_array(values: &[Option<i32>]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_i32(1);
        buf.put_i32(values.iter().any(Option::is_none) as i32);
        buf.put_u32(oid::INT4);
        buf.put_i32(values.len() as i32);
        buf.put_i32(1);
        for value in values {
            match value {
                Some(v) => {
                    buf.put_i32(4);
                    buf.put_i32(*v);
                }
                None => buf.put_i32(-1),
            }
        }
        buf.freeze()
    }

    #[tokio::test]
    async fn decode_with_null_element() {
        let registry = TypeRegistry::with_builtins();
        let decoder = registry.lookup(oid::INT4_ARRAY).unwrap();

        let mut bytes = int4_array(&[Some(4), None, Some(-9)]);
        let len = bytes.len();
        let value = decoder.decode(&mut bytes, len).await.unwrap();

        assert_eq!(
            value,
            Value::Array(vec![Some(Value::Int4(4)), None, Some(Value::Int4(-9))])
        );
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn encode_matches_wire_layout() {
        let registry = TypeRegistry::with_builtins();
        let decoder = registry.lookup(oid::INT4_ARRAY).unwrap();

        let mut buf = BytesMut::new();
        let value = Value::Array(vec![Some(Value::Int4(7)), None]);
        decoder.encode(&value, &mut buf).unwrap();

        assert_eq!(buf.freeze(), int4_array(&[Some(7), None]));
    }

    #[tokio::test]
    async fn oversized_length_fails_on_missing_element() {
        let registry = TypeRegistry::with_builtins();
        let decoder = registry.lookup(oid::TEXT_ARRAY).unwrap();

        let mut buf = BytesMut::new();
        buf.put_i32(1);
        buf.put_i32(0);
        buf.put_u32(oid::TEXT);
        buf.put_i32(i32::MAX);
        buf.put_i32(1);
        let mut bytes = buf.freeze();

        let err = decoder.decode(&mut bytes, 20).await.unwrap_err();
        let crate::ErrorKind::Io(e) = err.kind() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn reject_multi_dimension() {
        let registry = TypeRegistry::with_builtins();
        let decoder = registry.lookup(oid::INT4_ARRAY).unwrap();

        let mut buf = BytesMut::new();
        buf.put_i32(2);
        buf.put_i32(0);
        buf.put_u32(oid::INT4);
        let mut bytes = buf.freeze();

        let err = decoder.decode(&mut bytes, 12).await.unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::ErrorKind::Decode(DecodeError::ArrayDimension(2))
        ));
    }
}
