//! Event fields that deserialize on first access.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use hzwire_core::{Data, NegotiatedSerialization, Result};

/// A serialized event field, deserialized the first time it is read.
///
/// The result is memoized: every later read returns the same value without
/// touching the serializer again, even when several handlers of one event
/// read it concurrently.
pub struct LazyValue<T> {
    data: Option<Data>,
    serialization: Arc<NegotiatedSerialization>,
    value: OnceLock<T>,
    init: Mutex<()>,
}

impl<T: Any> LazyValue<T> {
    /// Wraps a serialized field; `None` stands for an absent field.
    pub fn new(data: Option<Data>, serialization: Arc<NegotiatedSerialization>) -> Self {
        Self {
            data,
            serialization,
            value: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Returns the deserialized value, or `None` if the field is absent.
    ///
    /// A decode failure is returned every time the field is read and is
    /// never memoized.
    pub fn get(&self) -> Result<Option<&T>> {
        let Some(data) = &self.data else {
            return Ok(None);
        };
        if let Some(value) = self.value.get() {
            return Ok(Some(value));
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if self.value.get().is_none() {
            let value = self.serialization.to_object::<T>(data)?;
            let _ = self.value.set(value);
        }
        Ok(self.value.get())
    }

    /// Returns the serialized form, if present.
    pub fn raw(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Returns `true` if the event carried this field.
    pub fn is_present(&self) -> bool {
        self.data.is_some()
    }

    /// Returns `true` once the field has been deserialized.
    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T> fmt::Debug for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyValue")
            .field("present", &self.data.is_some())
            .field("resolved", &self.value.get().is_some())
            .finish()
    }
}
