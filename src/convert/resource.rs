use std::collections::{btree_map, BTreeMap};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// A typed value held by a resource property.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    TimeSpan(Duration),
    Guid(Uuid),
    Bytes(Vec<u8>),
    /// Nested resource for Complex-kind properties.
    Resource(TypedResource),
    /// Element sequence for Collection-kind properties. Always present on a
    /// converted resource, possibly empty.
    Array(Vec<TypedValue>),
}

/// A typed resource instance: a resource type name plus the values set for
/// its declared properties. Properties without a value are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedResource {
    type_name: String,
    values: BTreeMap<String, TypedValue>,
}

impl TypedResource {
    pub fn new(type_name: &str) -> TypedResource {
        TypedResource {
            type_name: type_name.to_string(),
            values: BTreeMap::new(),
        }
    }

    /// Qualified name of the resource's type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, property_name: &str) -> Option<&TypedValue> {
        self.values.get(property_name)
    }

    pub fn set(&mut self, property_name: &str, value: TypedValue) {
        self.values.insert(property_name.to_string(), value);
    }

    /// Remove a property's value, returning it if it was set.
    pub fn unset(&mut self, property_name: &str) -> Option<TypedValue> {
        self.values.remove(property_name)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl IntoIterator for TypedResource {
    type Item = (String, TypedValue);
    type IntoIter = btree_map::IntoIter<String, TypedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
