
/// Postgres object identifier.
///
/// The oid type is implemented as an unsigned four-byte integer.
///
/// <https://www.postgresql.org/docs/current/datatype-oid.html>
pub type Oid = u32;

/// A type that have corresponding postgred oid.
pub trait PgType {
    const OID: Oid;
}

/// Oid of the builtin types which have a decoder in this crate.
///
/// Values are taken from `pg_type.dat`.
pub mod oid {
    use super::Oid;

    pub const BOOL: Oid = 16;
    pub const BYTEA: Oid = 17;
    pub const CHAR: Oid = 18;
    pub const NAME: Oid = 19;
    pub const INT8: Oid = 20;
    pub const INT2: Oid = 21;
    pub const INT4: Oid = 23;
    pub const TEXT: Oid = 25;
    pub const OID: Oid = 26;
    pub const JSON: Oid = 114;
    pub const FLOAT4: Oid = 700;
    pub const FLOAT8: Oid = 701;
    pub const BPCHAR: Oid = 1042;
    pub const VARCHAR: Oid = 1043;
    pub const TIMESTAMP: Oid = 1114;
    pub const TIMESTAMPTZ: Oid = 1184;
    /// Pseudo type of an anonymous row, e.g. `SELECT ROW(1,'a')`.
    pub const RECORD: Oid = 2249;
    pub const JSONB: Oid = 3802;

    pub const BOOL_ARRAY: Oid = 1000;
    pub const INT2_ARRAY: Oid = 1005;
    pub const INT4_ARRAY: Oid = 1007;
    pub const TEXT_ARRAY: Oid = 1009;
    pub const VARCHAR_ARRAY: Oid = 1015;
    pub const INT8_ARRAY: Oid = 1016;
    pub const FLOAT4_ARRAY: Oid = 1021;
    pub const FLOAT8_ARRAY: Oid = 1022;
}

macro_rules! oid {
    ($ty:ty, $oid:expr $(, $doc:literal)? ) => {
        impl PgType for $ty {
            $(#[doc = $doc])?
            const OID: Oid = $oid;
        }
    };
}

oid!(bool, oid::BOOL);
oid!(i8, oid::CHAR, "`\"char\"` single-byte internal type");
oid!(i64, oid::INT8, "`int8` ~18 digit integer, 8-byte storage");
oid!(i16, oid::INT2, "`int2` -32 thousand to 32 thousand, 2-byte storage");
oid!(i32, oid::INT4, "`int4` -2 billion to 2 billion integer, 4-byte storage");
oid!(f32, oid::FLOAT4, "`float4` single-precision floating point number, 4-byte storage");
oid!(f64, oid::FLOAT8, "`float8` double-precision floating point number, 8-byte storage");

#[cfg(feature = "time")]
oid!(time::PrimitiveDateTime, oid::TIMESTAMP, "date and time");
#[cfg(feature = "time")]
oid!(time::UtcDateTime, oid::TIMESTAMPTZ, "date and time with timezone");
