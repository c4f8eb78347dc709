use std::fmt;

use crate::{common::{ByteStr, unit_error}, postgres::Oid};

/// An error when composite field type is not registered.
pub struct UnknownFieldType {
    type_name: ByteStr,
    field: ByteStr,
    oid: Oid,
}

impl UnknownFieldType {
    pub(crate) fn new(type_name: ByteStr, field: ByteStr, oid: Oid) -> Self {
        Self { type_name, field, oid }
    }

    /// Composite type display name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Field with the unknown type.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The unknown type oid.
    pub fn oid(&self) -> Oid {
        self.oid
    }
}

impl std::error::Error for UnknownFieldType { }

impl fmt::Display for UnknownFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PostgreSQL composite type {} has field {} with an unknown type (TypeOID={})",
            self.type_name, self.field, self.oid,
        )
    }
}

impl fmt::Debug for UnknownFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

unit_error! {
    /// An error when the registry a decoder were created against is dropped.
    pub struct RegistryClosed("type registry is closed");
}
