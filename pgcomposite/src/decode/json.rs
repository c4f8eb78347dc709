use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::DecodeError;
use crate::value::Value;

/// The only `jsonb` binary format version.
pub(crate) const JSONB_VERSION: u8 = 1;

pub(crate) fn decode_json(bytes: &[u8]) -> Result<Value, DecodeError> {
    Ok(Value::Json(serde_json::from_slice(bytes)?))
}

pub(crate) fn decode_jsonb(mut bytes: Bytes) -> Result<Value, DecodeError> {
    match bytes.try_get_u8() {
        Ok(JSONB_VERSION) => decode_json(&bytes),
        Ok(version) => Err(DecodeError::JsonbVersion(version)),
        Err(_) => Err(DecodeError::InvalidLength {
            oid: crate::postgres::oid::JSONB,
            expected: 1,
            actual: 0,
        }),
    }
}

pub(crate) fn encode_json(value: &serde_json::Value, buf: &mut BytesMut) -> Result<(), DecodeError> {
    serde_json::to_writer(buf.writer(), value)?;
    Ok(())
}
