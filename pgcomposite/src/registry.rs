//! The [`Registry`] trait and connection scoped [`TypeRegistry`].
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::{
    common::verbose,
    composite::{CompositeDecoder, CompositeDecoderFactory, CompositeType},
    decode::{ArrayDecoder, Builtin, FieldDecoder},
    postgres::{Oid, oid},
};

/// Lookup of type decoders by oid.
pub trait Registry: Send + Sync {
    /// Returns the decoder registered for `oid`.
    fn lookup(&self, oid: Oid) -> Option<Arc<dyn FieldDecoder>>;
}

/// Builtin array types, `(array oid, name, element oid)`.
const ARRAYS: &[(Oid, &str, Oid)] = &[
    (oid::BOOL_ARRAY, "_bool", oid::BOOL),
    (oid::INT2_ARRAY, "_int2", oid::INT2),
    (oid::INT4_ARRAY, "_int4", oid::INT4),
    (oid::TEXT_ARRAY, "_text", oid::TEXT),
    (oid::VARCHAR_ARRAY, "_varchar", oid::VARCHAR),
    (oid::INT8_ARRAY, "_int8", oid::INT8),
    (oid::FLOAT4_ARRAY, "_float4", oid::FLOAT4),
    (oid::FLOAT8_ARRAY, "_float8", oid::FLOAT8),
];

/// Type decoders of a single connection.
///
/// Composite and array decoders only hold a weak reference back to the
/// registry, the registry must be kept alive as long as values are decoded.
///
/// Types can be registered in any order, composite field types are only
/// required to be registered before the first value is decoded.
#[derive(Default)]
pub struct TypeRegistry {
    decoders: RwLock<HashMap<Oid, Arc<dyn FieldDecoder>>>,
}

impl TypeRegistry {
    /// Create empty registry.
    pub fn new() -> Arc<TypeRegistry> {
        Arc::new(TypeRegistry::default())
    }

    /// Create registry with every [`Builtin`] and builtin array decoder registered.
    pub fn with_builtins() -> Arc<TypeRegistry> {
        let me = TypeRegistry::new();
        me.register_builtins();
        me
    }

    /// Register every [`Builtin`] and builtin array decoder.
    pub fn register_builtins(self: &Arc<Self>) {
        for builtin in Builtin::all() {
            self.register(Arc::new(builtin));
        }
        for &(oid, name, element) in ARRAYS {
            self.register_array(oid, name, element);
        }
    }

    /// Register decoder by its [`oid`][FieldDecoder::oid].
    ///
    /// Returns the previously registered decoder, if any.
    pub fn register(&self, decoder: Arc<dyn FieldDecoder>) -> Option<Arc<dyn FieldDecoder>> {
        verbose!(oid = decoder.oid(), name = decoder.type_name(), "register decoder");
        self.write().insert(decoder.oid(), decoder)
    }

    /// Register a composite type.
    ///
    /// Field types does not need to be registered yet.
    pub fn register_composite(self: &Arc<Self>, descriptor: Arc<CompositeType>) -> Arc<CompositeDecoder> {
        let decoder = Arc::new(CompositeDecoderFactory::create(self, descriptor));
        self.register(decoder.clone());
        decoder
    }

    /// Register an array type of `element`.
    pub fn register_array(self: &Arc<Self>, oid: Oid, name: &str, element: Oid) -> Arc<ArrayDecoder> {
        let decoder = Arc::new(ArrayDecoder::new(oid, name.to_owned(), element, self));
        self.register(decoder.clone());
        decoder
    }

    /// Remove a registered decoder.
    pub fn remove(&self, oid: Oid) -> Option<Arc<dyn FieldDecoder>> {
        self.write().remove(&oid)
    }

    pub fn contains(&self, oid: Oid) -> bool {
        self.read().contains_key(&oid)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Oid, Arc<dyn FieldDecoder>>> {
        self.decoders.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Oid, Arc<dyn FieldDecoder>>> {
        self.decoders.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Registry for TypeRegistry {
    fn lookup(&self, oid: Oid) -> Option<Arc<dyn FieldDecoder>> {
        self.read().get(&oid).cloned()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.read().values()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::DecoderKind;

    #[test]
    fn builtins_registered() {
        let registry = TypeRegistry::with_builtins();
        assert!(registry.contains(oid::INT4));
        assert!(registry.contains(oid::TEXT_ARRAY));
        assert!(!registry.contains(oid::RECORD));

        let text = registry.lookup(oid::TEXT).unwrap();
        assert_eq!(text.kind(), DecoderKind::Builtin);
        assert_eq!(text.type_name(), "text");
        assert_eq!(registry.lookup(oid::INT8_ARRAY).unwrap().kind(), DecoderKind::Array);
    }

    #[test]
    fn register_replace_and_remove() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register(Arc::new(Builtin::Int4)).is_none());
        assert!(registry.register(Arc::new(Builtin::Int4)).is_some());
        assert_eq!(registry.len(), 1);
        assert!(registry.remove(oid::INT4).is_some());
        assert!(registry.lookup(oid::INT4).is_none());
    }
}
