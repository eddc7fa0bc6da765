//! Shared object handles.
//!
//! An `ObjectRef` is the engine's view of one object in the graph under
//! validation: a runtime type name plus a set of named fields. Handles
//! are cheap to clone and compare by instance identity, never by field
//! contents. Fields are interior-mutable so cyclic graphs can be wired
//! up after construction.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::Value;

/// Field storage for an object.
pub type Fields = BTreeMap<String, Value>;

#[derive(Debug)]
struct Inner {
    type_name: String,
    fields: RwLock<Fields>,
}

/// Shared handle to a validatable object.
#[derive(Clone)]
pub struct ObjectRef {
    inner: Arc<Inner>,
}

/// Opaque instance identity, stable for the lifetime of the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentity(usize);

impl ObjectRef {
    /// Create a new object of the given runtime type with no fields.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self::with_fields(type_name, Fields::new())
    }

    /// Create a new object with the given fields.
    pub fn with_fields(type_name: impl Into<String>, fields: Fields) -> Self {
        Self {
            inner: Arc::new(Inner {
                type_name: type_name.into(),
                fields: RwLock::new(fields),
            }),
        }
    }

    /// Set a field, returning the handle for chaining.
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// The runtime type name of this object.
    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    /// Get a field value by name, cloned out of the object.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.fields.read().get(name).cloned()
    }

    /// Set a field value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.fields.write().insert(name.into(), value.into());
    }

    /// Remove a field, returning its previous value.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.inner.fields.write().remove(name)
    }

    /// The names of all fields currently set, in deterministic order.
    pub fn field_names(&self) -> Vec<String> {
        self.inner.fields.read().keys().cloned().collect()
    }

    /// The instance identity of this object.
    pub fn identity(&self) -> ObjectIdentity {
        ObjectIdentity(Arc::as_ptr(&self.inner) as usize)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    // Deliberately shallow: field contents may reference this object.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObjectRef({} @ {:#x})",
            self.inner.type_name,
            Arc::as_ptr(&self.inner) as usize
        )
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.type_name)
    }
}
