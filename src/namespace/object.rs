//! Shared property bags with data and accessor properties.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::types::Value;

/// Accessor read half.
pub type Getter = Rc<dyn Fn() -> Value>;

/// Accessor write half.
pub type Setter = Rc<dyn Fn(Value)>;

/// A property definition.
#[derive(Clone)]
pub enum Property {
    /// Plain stored value.
    Data(Value),
    /// Reads and writes are forwarded to these functions.
    Accessor { get: Getter, set: Setter },
}

/// Shared, insertion-ordered property bag.
///
/// Cloning the handle shares the object; equality of `Value::Object` is
/// identity of this handle.
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<Vec<(String, Property)>>>);

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an object from data properties.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let object = Object::new();
        for (key, value) in entries {
            object.define_value(key, value);
        }
        object
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.borrow().iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Whether `key` is currently defined as an accessor.
    pub fn is_accessor(&self, key: &str) -> bool {
        matches!(self.property(key), Some(Property::Accessor { .. }))
    }

    /// The raw definition of `key`.
    pub fn property(&self, key: &str) -> Option<Property> {
        self.0
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p.clone())
    }

    /// Read a property. Missing properties read as `Undefined`.
    pub fn get(&self, key: &str) -> Value {
        // Clone out first: the getter may touch this object again.
        match self.property(key) {
            Some(Property::Data(value)) => value,
            Some(Property::Accessor { get, .. }) => get(),
            None => Value::Undefined,
        }
    }

    /// Write a property, going through its setter when it has one.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        if let Some(Property::Accessor { set, .. }) = self.property(key) {
            set(value);
            return;
        }
        self.define_value(key, value);
    }

    /// Replace the definition of `key` with a data property.
    pub fn define_value(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.define(key.into(), Property::Data(value.into()));
    }

    /// Replace the definition of `key` with an accessor pair.
    pub fn define_accessor(&self, key: impl Into<String>, get: Getter, set: Setter) {
        self.define(key.into(), Property::Accessor { get, set });
    }

    fn define(&self, key: String, property: Property) {
        let mut entries = self.0.borrow_mut();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = property,
            None => entries.push((key, property)),
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        let mut entries = self.0.borrow_mut();
        let before = entries.len();
        entries.retain(|(k, _)| k != key);
        entries.len() != before
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.keys())
            .finish()
    }
}
