//! Dynamically typed decoded value.
use bytes::Bytes;
use std::fmt;

use crate::{common::ByteStr, ext::FmtExt, record::Record};

/// A decoded, non-null, postgres value.
///
/// `NULL` is never represented as a `Value`, a null composite field is
/// absent from its [`Record`] and a null array element is [`None`].
#[derive(Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    /// `"char"`, single byte internal type.
    Char(i8),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Oid(u32),
    /// `text`, `varchar`, `bpchar` and `name`.
    Text(ByteStr),
    Bytea(Bytes),
    /// Nested composite value.
    Record(Record),
    /// One dimensional array.
    Array(Vec<Option<Value>>),
    /// `json` and `jsonb`.
    #[cfg(feature = "json")]
    Json(serde_json::Value),
    #[cfg(feature = "time")]
    Timestamp(time::PrimitiveDateTime),
    #[cfg(feature = "time")]
    TimestampTz(time::UtcDateTime),
}

impl Value {
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns integer value, widening `int2` and `int4`.
    pub const fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int2(i) => Some(i as i64),
            Self::Int4(i) => Some(i as i64),
            Self::Int8(i) => Some(i),
            _ => None,
        }
    }

    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int4(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns float value, widening `float4`.
    pub const fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float4(f) => Some(f as f64),
            Self::Float8(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytea(b) => Some(b),
            _ => None,
        }
    }

    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Option<Value>]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }
}

macro_rules! from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

from! {
    bool => Bool,
    i8 => Char,
    i16 => Int2,
    i32 => Int4,
    i64 => Int8,
    f32 => Float4,
    f64 => Float8,
    ByteStr => Text,
    &'static str => Text,
    String => Text,
    Bytes => Bytea,
    Record => Record,
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => fmt::Debug::fmt(b, f),
            Self::Char(c) => fmt::Debug::fmt(c, f),
            Self::Int2(i) => fmt::Debug::fmt(i, f),
            Self::Int4(i) => fmt::Debug::fmt(i, f),
            Self::Int8(i) => fmt::Debug::fmt(i, f),
            Self::Float4(n) => fmt::Debug::fmt(n, f),
            Self::Float8(n) => fmt::Debug::fmt(n, f),
            Self::Oid(o) => write!(f, "oid({o})"),
            Self::Text(s) => fmt::Debug::fmt(s, f),
            Self::Bytea(b) => fmt::Debug::fmt(&b.lossy(), f),
            Self::Record(r) => fmt::Debug::fmt(r, f),
            Self::Array(a) => {
                let mut list = f.debug_list();
                for e in a {
                    match e {
                        Some(e) => list.entry(e),
                        None => list.entry(&format_args!("NULL")),
                    };
                }
                list.finish()
            },
            #[cfg(feature = "json")]
            Self::Json(j) => fmt::Debug::fmt(j, f),
            #[cfg(feature = "time")]
            Self::Timestamp(t) => fmt::Debug::fmt(t, f),
            #[cfg(feature = "time")]
            Self::TimestampTz(t) => fmt::Debug::fmt(t, f),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Char(c) => serializer.serialize_i8(*c),
            Self::Int2(i) => serializer.serialize_i16(*i),
            Self::Int4(i) => serializer.serialize_i32(*i),
            Self::Int8(i) => serializer.serialize_i64(*i),
            Self::Float4(n) => serializer.serialize_f32(*n),
            Self::Float8(n) => serializer.serialize_f64(*n),
            Self::Oid(o) => serializer.serialize_u32(*o),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Bytea(b) => serializer.serialize_bytes(b),
            Self::Record(r) => serde::Serialize::serialize(r, serializer),
            Self::Array(a) => serializer.collect_seq(a),
            #[cfg(feature = "json")]
            Self::Json(j) => serde::Serialize::serialize(j, serializer),
            #[cfg(feature = "time")]
            Self::Timestamp(t) => serializer.collect_str(t),
            #[cfg(feature = "time")]
            Self::TimestampTz(t) => serializer.collect_str(t),
        }
    }
}
