//! Value classification: mapping raw field values to semantic types.
//!
//! Pure functions with no access to the metadata cache. The sampler drives
//! these to decide whether a field registers as a primitive, a complex type,
//! a collection, or stays unresolved for the rest of the pass.

use crate::document::DocumentValue;

use super::{NativeKind, PropertyType};

/// Classification of a raw field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    Scalar(PropertyType),
    /// Object-valued field; registers a nested complex type.
    Object,
    /// Array-valued field; registers a collection property.
    Array,
    /// Null value; the field's type cannot be determined yet.
    Unresolved,
}

/// Classify a raw value into the semantic categories driving inference.
pub fn classify(value: &DocumentValue) -> ValueClass {
    match value {
        DocumentValue::Null => ValueClass::Unresolved,
        DocumentValue::Object(_) => ValueClass::Object,
        DocumentValue::Array(_) => ValueClass::Array,
        _ => match scalar_type(value) {
            Some(t) => ValueClass::Scalar(t),
            None => ValueClass::Unresolved,
        },
    }
}

/// Semantic type of a scalar value, or `None` for null and structured values.
pub fn scalar_type(value: &DocumentValue) -> Option<PropertyType> {
    match value {
        DocumentValue::Bool(_) => Some(PropertyType::Boolean),
        DocumentValue::Int(_) => Some(PropertyType::Int64),
        DocumentValue::Float(_) => Some(PropertyType::Float64),
        DocumentValue::String(_) => Some(PropertyType::String),
        DocumentValue::DateTime(_) => Some(PropertyType::DateTime),
        DocumentValue::TimeSpan(_) => Some(PropertyType::TimeSpan),
        DocumentValue::Guid(_) => Some(PropertyType::Guid),
        DocumentValue::Bytes(_) => Some(PropertyType::Bytes),
        DocumentValue::Null | DocumentValue::Array(_) | DocumentValue::Object(_) => None,
    }
}

/// Native kind recorded in the provider-type registry, or `None` when the
/// value cannot resolve a type (null).
pub fn native_kind(value: &DocumentValue) -> Option<NativeKind> {
    match classify(value) {
        ValueClass::Scalar(t) => Some(NativeKind::Scalar(t)),
        ValueClass::Object => Some(NativeKind::Object),
        ValueClass::Array => Some(NativeKind::Array),
        ValueClass::Unresolved => None,
    }
}
