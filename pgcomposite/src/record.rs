//! Decoded composite value.
//!
//! - [`Record`]
//! - [`IntoIter`]
use std::{fmt, ops::Index};

use crate::{common::ByteStr, value::Value};

/// Ordered mapping of field name to value.
///
/// Only non-null fields are present, field order follows the composite type
/// declaration order.
#[derive(Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(ByteStr, Value)>,
}

impl Record {
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: Vec::with_capacity(capacity) }
    }

    /// Returns the number of non-null fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if every field is null.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a field.
    ///
    /// If `name` already present, its value is replaced in place and the
    /// previous value is returned.
    pub fn insert(&mut self, name: impl Into<ByteStr>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, old)) => Some(std::mem::replace(old, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Append a field without checking for duplicate name.
    pub(crate) fn push(&mut self, name: ByteStr, value: Value) {
        self.fields.push((name, value));
    }

    /// Get value by field name.
    ///
    /// Returns [`None`] if field is null or does not exist.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Returns `true` if field exists and is not null.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Returns fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Index<&str> for Record {
    type Output = Value;

    /// # Panics
    ///
    /// Panics if field is null or does not exist.
    fn index(&self, name: &str) -> &Self::Output {
        match self.get(name) {
            Some(v) => v,
            None => panic!("field {name:?} is null or does not exist"),
        }
    }
}

impl IntoIterator for Record {
    type Item = (ByteStr, Value);

    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { iter: self.fields.into_iter() }
    }
}

/// [`IntoIterator`] implementation from [`Record`].
#[derive(Debug)]
pub struct IntoIter {
    iter: std::vec::IntoIter<(ByteStr, Value)>,
}

impl Iterator for IntoIter {
    type Item = (ByteStr, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for IntoIter { }

impl<K: Into<ByteStr>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut record = Record::new();
        record.insert("zeta", 1);
        record.insert("alpha", "a");
        assert_eq!(record.insert("zeta", 2), Some(Value::Int4(1)));

        assert_eq!(record.keys().collect::<Vec<_>>(), ["zeta", "alpha"]);
        assert_eq!(record["zeta"], Value::Int4(2));
        assert!(!record.contains_key("missing"));
        assert_eq!(format!("{record:?}"), r#"{"zeta": 2, "alpha": "a"}"#);
    }
}
