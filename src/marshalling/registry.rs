//! Type-keyed marshaller lookup.
//!
//! Marshallers are resolved by the static type of the completed value:
//! `complete::<T>` asks the registry for the `Marshaller<T>` registered under
//! `TypeId::of::<T>()`. Registration is explicit; there is no fallback search.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;

use super::{
    BytesMarshaller, ChunkedBody, ChunkedBodyMarshaller, EntityMarshaller, JsonMarshaller,
    Marshaller, StringMarshaller,
};
use crate::model::HttpEntity;

/// Entry for a registered type.
struct RegistryEntry {
    /// `Arc<dyn Marshaller<T>>`, erased.
    marshaller: Box<dyn Any + Send + Sync>,
    /// For diagnostics.
    type_name: &'static str,
}

/// Registry mapping value types to marshallers.
#[derive(Default)]
pub struct MarshallerRegistry {
    entries: HashMap<TypeId, RegistryEntry>,
}

impl MarshallerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with marshallers for `String`, `&'static str`, `Bytes`,
    /// `Vec<u8>`, `serde_json::Value`, `HttpEntity` and `ChunkedBody`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register::<String, _>(StringMarshaller)
            .register::<&'static str, _>(StringMarshaller)
            .register::<Bytes, _>(BytesMarshaller)
            .register::<Vec<u8>, _>(BytesMarshaller)
            .register::<serde_json::Value, _>(JsonMarshaller)
            .register::<HttpEntity, _>(EntityMarshaller)
            .register::<ChunkedBody, _>(ChunkedBodyMarshaller);
        registry
    }

    /// The process-wide default registry, built on first use.
    pub fn shared_defaults() -> Arc<MarshallerRegistry> {
        static DEFAULTS: OnceLock<Arc<MarshallerRegistry>> = OnceLock::new();
        DEFAULTS
            .get_or_init(|| Arc::new(Self::with_defaults()))
            .clone()
    }

    /// Register `marshaller` for values of type `T`, replacing any previous one.
    pub fn register<T, M>(&mut self, marshaller: M) -> &mut Self
    where
        T: ?Sized + 'static,
        M: Marshaller<T>,
    {
        let marshaller: Arc<dyn Marshaller<T>> = Arc::new(marshaller);
        self.register_arc(marshaller)
    }

    /// Register an already shared marshaller for values of type `T`.
    pub fn register_arc<T>(&mut self, marshaller: Arc<dyn Marshaller<T>>) -> &mut Self
    where
        T: ?Sized + 'static,
    {
        let previous = self.entries.insert(
            TypeId::of::<T>(),
            RegistryEntry {
                marshaller: Box::new(marshaller),
                type_name: type_name::<T>(),
            },
        );
        if previous.is_some() {
            tracing::debug!("Replacing marshaller for {}", type_name::<T>());
        }
        self
    }

    /// Marshaller registered for `T`, if any.
    pub fn lookup<T>(&self) -> Option<Arc<dyn Marshaller<T>>>
    where
        T: ?Sized + 'static,
    {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.marshaller.downcast_ref::<Arc<dyn Marshaller<T>>>())
            .cloned()
    }

    /// Whether a marshaller is registered for `T`.
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered marshallers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no marshaller is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of all registered types, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for MarshallerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarshallerRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
