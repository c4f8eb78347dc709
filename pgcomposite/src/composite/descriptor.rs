use crate::{common::ByteStr, postgres::Oid};

/// Catalog metadata of a composite type.
///
/// Field order is the declaration order in `pg_attribute`, which is also
/// the order fields are sent in the binary format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeType {
    oid: Oid,
    name: ByteStr,
    fields: Vec<CompositeField>,
}

/// A single field of [`CompositeType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeField {
    name: ByteStr,
    oid: Oid,
}

impl CompositeType {
    /// Create composite type without any field.
    pub fn new(oid: Oid, name: impl Into<ByteStr>) -> Self {
        Self { oid, name: name.into(), fields: Vec::new() }
    }

    /// Append a field with type `oid`.
    pub fn field(mut self, name: impl Into<ByteStr>, oid: Oid) -> Self {
        self.fields.push(CompositeField { name: name.into(), oid });
        self
    }

    pub fn oid(&self) -> Oid {
        self.oid
    }

    /// Display name, e.g. `public.address`.
    pub fn name(&self) -> &ByteStr {
        &self.name
    }

    pub fn fields(&self) -> &[CompositeField] {
        &self.fields
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl CompositeField {
    pub fn name(&self) -> &ByteStr {
        &self.name
    }

    /// Declared field type.
    pub fn oid(&self) -> Oid {
        self.oid
    }
}
