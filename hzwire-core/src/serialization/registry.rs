//! Type-id keyed registry of serializers.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::serializer::*;
use super::{Data, ObjectDataInput, ObjectDataOutput};
use crate::error::{HzError, Result};

/// Collects serializers during configuration.
///
/// Registration is single-threaded and happens before any encode or decode;
/// [`build`](Self::build) freezes the result into a [`SerializerRegistry`].
pub struct SerializerRegistryBuilder {
    by_id: HashMap<i32, Arc<dyn SerializerAdapter>>,
}

impl SerializerRegistryBuilder {
    /// Creates a builder pre-populated with the built-in serializers.
    pub fn new() -> Self {
        let mut builder = Self::empty();
        builder.insert(Arc::new(StreamSerializerAdapter::new(ByteSerializer)));
        builder.insert(Arc::new(StreamSerializerAdapter::new(BooleanSerializer)));
        builder.insert(Arc::new(StreamSerializerAdapter::new(ShortSerializer)));
        builder.insert(Arc::new(StreamSerializerAdapter::new(IntegerSerializer)));
        builder.insert(Arc::new(StreamSerializerAdapter::new(LongSerializer)));
        builder.insert(Arc::new(StreamSerializerAdapter::new(FloatSerializer)));
        builder.insert(Arc::new(StreamSerializerAdapter::new(DoubleSerializer)));
        builder.insert(Arc::new(StreamSerializerAdapter::new(StringSerializer)));
        builder.insert(Arc::new(StreamSerializerAdapter::new(ByteArraySerializer)));
        builder.insert(Arc::new(StreamSerializerAdapter::new(UuidSerializer)));
        builder
    }

    /// Creates a builder with no serializers at all.
    pub fn empty() -> Self {
        Self {
            by_id: HashMap::new(),
        }
    }

    fn insert(&mut self, adapter: Arc<dyn SerializerAdapter>) {
        self.by_id.insert(adapter.serializer_id(), adapter);
    }

    /// Registers a user serializer.
    ///
    /// User type ids must be positive; negative ids belong to the built-in
    /// serializers. Registering a different serializer under a taken id fails
    /// with [`HzError::DuplicateTypeId`]; registering an equal one again is a no-op.
    /// Each Rust type has exactly one serializer, so a second serializer for
    /// a type that is already bound, built-ins included, is a
    /// [`HzError::Configuration`] error.
    pub fn register<S: StreamSerializer>(&mut self, serializer: S) -> Result<&mut Self> {
        let type_id = serializer.serializer_id();
        if type_id <= 0 {
            return Err(HzError::Configuration(format!(
                "user serializer type id must be positive, got {type_id}"
            )));
        }

        let adapter: Arc<dyn SerializerAdapter> = Arc::new(StreamSerializerAdapter::new(serializer));
        if let Some(existing) = self.by_id.get(&type_id) {
            if **existing == *adapter {
                tracing::debug!(type_id, "serializer already registered");
                return Ok(self);
            }
            return Err(HzError::DuplicateTypeId(type_id));
        }
        if let Some(bound) = self
            .by_id
            .values()
            .find(|existing| existing.value_type() == adapter.value_type())
        {
            return Err(HzError::Configuration(format!(
                "{} is already serialized with type id {}",
                adapter.value_type_name(),
                bound.serializer_id()
            )));
        }

        tracing::debug!(type_id, value_type = adapter.value_type_name(), "serializer registered");
        self.by_id.insert(type_id, adapter);
        Ok(self)
    }

    /// Freezes the registrations into an immutable registry.
    pub fn build(self) -> SerializerRegistry {
        let by_type = self
            .by_id
            .values()
            .map(|adapter| (adapter.value_type(), Arc::clone(adapter)))
            .collect();
        SerializerRegistry {
            by_id: self.by_id,
            by_type,
            destroyed: AtomicBool::new(false),
        }
    }
}

impl Default for SerializerRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The only path between typed values and [`Data`].
///
/// Immutable once built and shared by `Arc`, so concurrent lookups never lock.
pub struct SerializerRegistry {
    by_id: HashMap<i32, Arc<dyn SerializerAdapter>>,
    by_type: HashMap<TypeId, Arc<dyn SerializerAdapter>>,
    destroyed: AtomicBool,
}

impl SerializerRegistry {
    /// Starts a builder with the built-in serializers registered.
    pub fn builder() -> SerializerRegistryBuilder {
        SerializerRegistryBuilder::new()
    }

    /// Returns the serializer for a type id.
    ///
    /// An unknown id on inbound data means the payload cannot be trusted and
    /// fails with [`HzError::UnknownType`].
    pub fn resolve(&self, type_id: i32) -> Result<&Arc<dyn SerializerAdapter>> {
        self.by_id.get(&type_id).ok_or(HzError::UnknownType(type_id))
    }

    /// Returns the serializer registered for the Rust type `T`.
    pub fn resolve_for<T: Any>(&self) -> Result<&Arc<dyn SerializerAdapter>> {
        self.by_type.get(&TypeId::of::<T>()).ok_or_else(|| {
            HzError::Serialization(format!(
                "no serializer registered for {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Serializes `value` with the serializer registered for its type.
    pub fn to_data<T: Any + Send + Sync>(&self, value: &T) -> Result<Data> {
        let adapter = self.resolve_for::<T>()?;
        let mut output = ObjectDataOutput::new();
        adapter.write(&mut output, value)?;
        Ok(Data::new(adapter.serializer_id(), 0, output.as_bytes()))
    }

    /// Deserializes `data` with the serializer named by its type id.
    ///
    /// Fails with [`HzError::SerializationType`] if that serializer produces
    /// something other than `T`.
    pub fn to_object<T: Any>(&self, data: &Data) -> Result<T> {
        let adapter = self.resolve(data.type_id())?;
        let mut input = ObjectDataInput::new(data.payload());
        let value: Box<dyn Any> = adapter.read(&mut input)?;
        value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| HzError::SerializationType {
                expected: std::any::type_name::<T>(),
                actual: adapter.value_type_name(),
            })
    }

    /// Returns the number of registered serializers.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if no serializer is registered.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Calls every serializer's shutdown hook exactly once.
    ///
    /// Later calls are no-ops, so racing shutdown paths are harmless.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        for adapter in self.by_id.values() {
            adapter.destroy();
        }
        tracing::info!(serializers = self.by_id.len(), "serializer registry destroyed");
    }

    /// Returns true once [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}

impl Drop for SerializerRegistry {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.by_id.keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct("SerializerRegistry")
            .field("type_ids", &ids)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
