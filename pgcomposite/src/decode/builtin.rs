use bytes::{BufMut, Bytes, BytesMut};
use futures_core::future::LocalBoxFuture;

use super::{DecodeError, DecoderKind, FieldDecoder, read_payload};
use crate::{
    Result,
    common::ByteStr,
    frame::FrameReader,
    postgres::{Oid, PgType, oid},
    value::Value,
};

/// Decoder for builtin scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Bool,
    Bytea,
    Char,
    Name,
    Int8,
    Int2,
    Int4,
    Text,
    Oid,
    Float4,
    Float8,
    Bpchar,
    Varchar,
    #[cfg(feature = "json")]
    Json,
    #[cfg(feature = "json")]
    Jsonb,
    #[cfg(feature = "time")]
    Timestamp,
    #[cfg(feature = "time")]
    TimestampTz,
}

const SCALARS: &[Builtin] = &[
    Builtin::Bool,
    Builtin::Bytea,
    Builtin::Char,
    Builtin::Name,
    Builtin::Int8,
    Builtin::Int2,
    Builtin::Int4,
    Builtin::Text,
    Builtin::Oid,
    Builtin::Float4,
    Builtin::Float8,
    Builtin::Bpchar,
    Builtin::Varchar,
];

#[cfg(feature = "json")]
const JSON: &[Builtin] = &[Builtin::Json, Builtin::Jsonb];
#[cfg(not(feature = "json"))]
const JSON: &[Builtin] = &[];

#[cfg(feature = "time")]
const TIME: &[Builtin] = &[Builtin::Timestamp, Builtin::TimestampTz];
#[cfg(not(feature = "time"))]
const TIME: &[Builtin] = &[];

impl Builtin {
    /// Returns every builtin decoder enabled by crate features.
    pub fn all() -> impl Iterator<Item = Builtin> {
        SCALARS.iter().chain(JSON).chain(TIME).copied()
    }

    pub fn from_oid(oid: Oid) -> Option<Builtin> {
        Self::all().find(|b| b.oid() == oid)
    }

    pub const fn oid(self) -> Oid {
        match self {
            Self::Bool => bool::OID,
            Self::Bytea => oid::BYTEA,
            Self::Char => i8::OID,
            Self::Name => oid::NAME,
            Self::Int8 => i64::OID,
            Self::Int2 => i16::OID,
            Self::Int4 => i32::OID,
            Self::Text => oid::TEXT,
            Self::Oid => oid::OID,
            Self::Float4 => f32::OID,
            Self::Float8 => f64::OID,
            Self::Bpchar => oid::BPCHAR,
            Self::Varchar => oid::VARCHAR,
            #[cfg(feature = "json")]
            Self::Json => oid::JSON,
            #[cfg(feature = "json")]
            Self::Jsonb => oid::JSONB,
            #[cfg(feature = "time")]
            Self::Timestamp => oid::TIMESTAMP,
            #[cfg(feature = "time")]
            Self::TimestampTz => oid::TIMESTAMPTZ,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Bytea => "bytea",
            Self::Char => "char",
            Self::Name => "name",
            Self::Int8 => "int8",
            Self::Int2 => "int2",
            Self::Int4 => "int4",
            Self::Text => "text",
            Self::Oid => "oid",
            Self::Float4 => "float4",
            Self::Float8 => "float8",
            Self::Bpchar => "bpchar",
            Self::Varchar => "varchar",
            #[cfg(feature = "json")]
            Self::Json => "json",
            #[cfg(feature = "json")]
            Self::Jsonb => "jsonb",
            #[cfg(feature = "time")]
            Self::Timestamp => "timestamp",
            #[cfg(feature = "time")]
            Self::TimestampTz => "timestamptz",
        }
    }

    /// Decode a complete payload.
    pub fn decode_bytes(self, bytes: Bytes) -> Result<Value, DecodeError> {
        let value = match self {
            Self::Bool => Value::Bool(self.fixed::<1>(&bytes)?[0] != 0),
            Self::Char => Value::Char(i8::from_be_bytes(self.fixed(&bytes)?)),
            Self::Int2 => Value::Int2(i16::from_be_bytes(self.fixed(&bytes)?)),
            Self::Int4 => Value::Int4(i32::from_be_bytes(self.fixed(&bytes)?)),
            Self::Int8 => Value::Int8(i64::from_be_bytes(self.fixed(&bytes)?)),
            Self::Oid => Value::Oid(u32::from_be_bytes(self.fixed(&bytes)?)),
            Self::Float4 => Value::Float4(f32::from_be_bytes(self.fixed(&bytes)?)),
            Self::Float8 => Value::Float8(f64::from_be_bytes(self.fixed(&bytes)?)),
            Self::Text | Self::Name | Self::Bpchar | Self::Varchar => {
                Value::Text(ByteStr::from_utf8(bytes)?)
            }
            Self::Bytea => Value::Bytea(bytes),
            #[cfg(feature = "json")]
            Self::Json => super::json::decode_json(&bytes)?,
            #[cfg(feature = "json")]
            Self::Jsonb => super::json::decode_jsonb(bytes)?,
            #[cfg(feature = "time")]
            Self::Timestamp => super::timestamp::decode_timestamp(self.fixed(&bytes)?),
            #[cfg(feature = "time")]
            Self::TimestampTz => super::timestamp::decode_timestamptz(self.fixed(&bytes)?),
        };
        Ok(value)
    }

    /// Write the binary representation of `value`.
    pub fn encode_value(self, value: &Value, buf: &mut BytesMut) -> Result<(), DecodeError> {
        match (self, value) {
            (Self::Bool, Value::Bool(b)) => buf.put_u8(*b as u8),
            (Self::Char, Value::Char(c)) => buf.put_i8(*c),
            (Self::Int2, Value::Int2(i)) => buf.put_i16(*i),
            (Self::Int4, Value::Int4(i)) => buf.put_i32(*i),
            (Self::Int8, Value::Int8(i)) => buf.put_i64(*i),
            (Self::Oid, Value::Oid(o)) => buf.put_u32(*o),
            (Self::Float4, Value::Float4(n)) => buf.put_f32(*n),
            (Self::Float8, Value::Float8(n)) => buf.put_f64(*n),
            (Self::Text | Self::Name | Self::Bpchar | Self::Varchar, Value::Text(s)) => {
                buf.put_slice(s.as_bytes())
            }
            (Self::Bytea, Value::Bytea(b)) => buf.put_slice(b),
            #[cfg(feature = "json")]
            (Self::Json, Value::Json(j)) => super::json::encode_json(j, buf)?,
            #[cfg(feature = "json")]
            (Self::Jsonb, Value::Json(j)) => {
                buf.put_u8(super::json::JSONB_VERSION);
                super::json::encode_json(j, buf)?
            }
            #[cfg(feature = "time")]
            (Self::Timestamp, Value::Timestamp(t)) => {
                buf.put_i64(super::timestamp::encode_timestamp(*t))
            }
            #[cfg(feature = "time")]
            (Self::TimestampTz, Value::TimestampTz(t)) => {
                buf.put_i64(super::timestamp::encode_timestamptz(*t))
            }
            _ => return Err(DecodeError::TypeMismatch { expected: self.name() }),
        }
        Ok(())
    }

    fn fixed<const N: usize>(self, bytes: &[u8]) -> Result<[u8; N], DecodeError> {
        bytes.try_into().map_err(|_| DecodeError::InvalidLength {
            oid: self.oid(),
            expected: N,
            actual: bytes.len(),
        })
    }
}

impl FieldDecoder for Builtin {
    fn kind(&self) -> DecoderKind {
        DecoderKind::Builtin
    }

    fn oid(&self) -> Oid {
        Builtin::oid(*self)
    }

    fn type_name(&self) -> &str {
        self.name()
    }

    fn decode<'a>(
        &'a self,
        reader: &'a mut dyn FrameReader,
        len: usize,
    ) -> LocalBoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            let bytes = read_payload(reader, len).await?;
            Ok(self.decode_bytes(bytes)?)
        })
    }

    fn encode(&self, value: &Value, buf: &mut BytesMut) -> Result<()> {
        Ok(self.encode_value(value, buf)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_fixed_width() {
        let v = Builtin::Int4.decode_bytes(Bytes::from_static(&[0, 0, 1, 0])).unwrap();
        assert_eq!(v, Value::Int4(256));

        let v = Builtin::Float8.decode_bytes(Bytes::copy_from_slice(&1.5f64.to_be_bytes())).unwrap();
        assert_eq!(v, Value::Float8(1.5));

        let v = Builtin::Bool.decode_bytes(Bytes::from_static(&[1])).unwrap();
        assert_eq!(v, Value::Bool(true));

        let err = Builtin::Int8.decode_bytes(Bytes::from_static(&[0, 1])).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidLength { oid: oid::INT8, expected: 8, actual: 2 }
        ));
    }

    #[test]
    fn decode_text() {
        let v = Builtin::Varchar.decode_bytes(Bytes::from_static(b"Jakarta")).unwrap();
        assert_eq!(v.as_str(), Some("Jakarta"));

        let err = Builtin::Text.decode_bytes(Bytes::from_static(b"\xc3\x28")).unwrap_err();
        assert!(matches!(err, DecodeError::Utf8(_)));
    }

    #[test]
    fn encode_checks_value_type() {
        let mut buf = BytesMut::new();
        Builtin::Int2.encode_value(&Value::Int2(-2), &mut buf).unwrap();
        assert_eq!(&buf[..], &[0xff, 0xfe]);

        let err = Builtin::Int2.encode_value(&Value::Int4(1), &mut buf).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { expected: "int2" }));
    }

    #[test]
    fn lookup_by_oid() {
        assert_eq!(Builtin::from_oid(oid::VARCHAR), Some(Builtin::Varchar));
        assert_eq!(Builtin::from_oid(oid::RECORD), None);
    }
}
