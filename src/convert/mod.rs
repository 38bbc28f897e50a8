//! Document ↔ typed-resource conversion.
//!
//! Converts raw documents into [`TypedResource`] instances under a resolved
//! schema snapshot, and typed resources back into sparse documents. Unknown
//! fields are dropped silently; per-value coercion failures are fatal for the
//! single conversion call and never touch the shared schema.

mod resource;

pub use resource::{TypedResource, TypedValue};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::DateTime;
use uuid::Uuid;

use crate::document::{Document, DocumentValue};
use crate::metadata::{MetadataError, MetadataSnapshot};
use crate::schema::{naming, CollectionElement, PropertyKind, PropertyType, ResourceType};

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Conversion errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// The schema snapshot has no type or set under the requested name.
    #[error(transparent)]
    Schema(#[from] MetadataError),

    /// A document value cannot be coerced to its property's declared type.
    #[error("cannot convert value of property `{property}` to {expected}: got {actual}")]
    Coercion {
        property: String,
        expected: String,
        actual: String,
    },
}

impl ConvertError {
    fn coercion(property: &str, expected: impl Into<String>, actual: &DocumentValue) -> ConvertError {
        ConvertError::Coercion {
            property: property.to_string(),
            expected: expected.into(),
            actual: value_kind_name(actual).to_string(),
        }
    }
}

fn value_kind_name(value: &DocumentValue) -> &'static str {
    match value {
        DocumentValue::Null => "null",
        DocumentValue::Bool(_) => "boolean",
        DocumentValue::Int(_) => "int64",
        DocumentValue::Float(_) => "float64",
        DocumentValue::String(_) => "string",
        DocumentValue::DateTime(_) => "datetime",
        DocumentValue::TimeSpan(_) => "timespan",
        DocumentValue::Guid(_) => "guid",
        DocumentValue::Bytes(_) => "bytes",
        DocumentValue::Array(_) => "array",
        DocumentValue::Object(_) => "object",
    }
}

/// Convert a raw document into a typed resource of the named type.
///
/// Postconditions: every Collection-kind property of the result holds a
/// (possibly empty) sequence, and every other declared property is either
/// absent or holds a value of its declared type.
pub fn to_resource(
    snapshot: &MetadataSnapshot,
    document: &Document,
    resource_name: &str,
) -> ConvertResult<TypedResource> {
    let resource_type = snapshot.resource_type(resource_name)?;
    convert_document(snapshot, document, resource_type)
}

/// Convert a typed resource back into a sparse raw document.
///
/// Only declared properties with a value are emitted, under the property's
/// model name; properties with no value are omitted entirely.
pub fn to_document(
    snapshot: &MetadataSnapshot,
    resource: &TypedResource,
    resource_name: &str,
) -> ConvertResult<Document> {
    let set = snapshot.resource_set(resource_name)?;
    let resource_type = snapshot.resource_type(&set.type_name)?;

    let mut document = Document::new();
    for property in &resource_type.properties {
        if let Some(value) = resource.get(&property.name) {
            document.set(property.name.clone(), typed_to_raw(value));
        }
    }
    Ok(document)
}

fn convert_document(
    snapshot: &MetadataSnapshot,
    document: &Document,
    resource_type: &ResourceType,
) -> ConvertResult<TypedResource> {
    let mut resource = TypedResource::new(&resource_type.name);

    for (field, value) in document.fields() {
        let property_name = naming::resource_property_name(field, resource_type.kind);
        // Unknown fields are dropped silently; best-effort by design.
        let Some(property) = resource_type.property(&property_name) else {
            continue;
        };
        if let Some(converted) = convert_value(snapshot, &property.kind, &property_name, value)? {
            resource.set(&property.name, converted);
        }
    }

    assign_empty_collections(&mut resource, resource_type);
    Ok(resource)
}

fn convert_value(
    snapshot: &MetadataSnapshot,
    kind: &PropertyKind,
    property_name: &str,
    value: &DocumentValue,
) -> ConvertResult<Option<TypedValue>> {
    match kind {
        PropertyKind::Complex { type_name } => match value {
            DocumentValue::Null => Ok(None),
            DocumentValue::Object(document) => {
                let nested_type = snapshot.resource_type(type_name)?;
                Ok(Some(TypedValue::Resource(convert_document(
                    snapshot,
                    document,
                    nested_type,
                )?)))
            }
            other => Err(ConvertError::coercion(property_name, type_name.clone(), other)),
        },
        PropertyKind::Collection { element } => match value {
            // Null collections become empty sequences, never null.
            DocumentValue::Null => Ok(Some(TypedValue::Array(Vec::new()))),
            DocumentValue::Array(items) => {
                let mut converted = Vec::new();
                for item in items {
                    if item.is_null() {
                        continue;
                    }
                    converted.push(convert_element(snapshot, element, property_name, item)?);
                }
                Ok(Some(TypedValue::Array(converted)))
            }
            other => Err(ConvertError::coercion(property_name, "array", other)),
        },
        PropertyKind::Key { value_type } | PropertyKind::Primitive { value_type, .. } => {
            match value {
                DocumentValue::Null => Ok(None),
                other => coerce_scalar(other, *value_type, property_name).map(Some),
            }
        }
    }
}

fn convert_element(
    snapshot: &MetadataSnapshot,
    element: &CollectionElement,
    property_name: &str,
    value: &DocumentValue,
) -> ConvertResult<TypedValue> {
    match element {
        CollectionElement::Complex(type_name) => match value {
            DocumentValue::Object(document) => {
                let nested_type = snapshot.resource_type(type_name)?;
                Ok(TypedValue::Resource(convert_document(
                    snapshot,
                    document,
                    nested_type,
                )?))
            }
            other => Err(ConvertError::coercion(property_name, type_name.clone(), other)),
        },
        CollectionElement::Scalar(value_type) => coerce_scalar(value, *value_type, property_name),
    }
}

/// Coerce a scalar document value to a declared semantic type.
///
/// The declared nullable wrapper is irrelevant here: null was handled by the
/// caller, so coercion always targets the underlying non-nullable type.
fn coerce_scalar(
    value: &DocumentValue,
    target: PropertyType,
    property_name: &str,
) -> ConvertResult<TypedValue> {
    let mismatch = || ConvertError::coercion(property_name, target.as_str(), value);

    match target {
        // Anything scalar renders into a string; this also covers properties
        // that were force-typed to string after an all-null sampling pass.
        PropertyType::String => match value {
            DocumentValue::String(s) => Ok(TypedValue::String(s.clone())),
            DocumentValue::Bool(b) => Ok(TypedValue::String(b.to_string())),
            DocumentValue::Int(i) => Ok(TypedValue::String(i.to_string())),
            DocumentValue::Float(f) => Ok(TypedValue::String(f.to_string())),
            DocumentValue::DateTime(dt) => Ok(TypedValue::String(dt.to_rfc3339())),
            DocumentValue::TimeSpan(ts) => Ok(TypedValue::String(
                (ts.num_milliseconds() as f64 / 1000.0).to_string(),
            )),
            DocumentValue::Guid(guid) => Ok(TypedValue::String(guid.to_string())),
            DocumentValue::Bytes(bytes) => Ok(TypedValue::String(BASE64.encode(bytes))),
            _ => Err(mismatch()),
        },
        PropertyType::Boolean => match value {
            DocumentValue::Bool(b) => Ok(TypedValue::Bool(*b)),
            _ => Err(mismatch()),
        },
        PropertyType::Int64 => match value {
            DocumentValue::Int(i) => Ok(TypedValue::Int(*i)),
            DocumentValue::Float(f) if f.fract() == 0.0 => Ok(TypedValue::Int(*f as i64)),
            _ => Err(mismatch()),
        },
        PropertyType::Float64 => match value {
            DocumentValue::Float(f) => Ok(TypedValue::Float(*f)),
            DocumentValue::Int(i) => Ok(TypedValue::Float(*i as f64)),
            _ => Err(mismatch()),
        },
        PropertyType::DateTime => match value {
            DocumentValue::DateTime(dt) => Ok(TypedValue::DateTime(*dt)),
            DocumentValue::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| TypedValue::DateTime(dt.with_timezone(&chrono::Utc)))
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        PropertyType::TimeSpan => match value {
            DocumentValue::TimeSpan(ts) => Ok(TypedValue::TimeSpan(*ts)),
            _ => Err(mismatch()),
        },
        PropertyType::Guid => match value {
            DocumentValue::Guid(guid) => Ok(TypedValue::Guid(*guid)),
            DocumentValue::String(s) => Uuid::parse_str(s)
                .map(TypedValue::Guid)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        PropertyType::Bytes => match value {
            DocumentValue::Bytes(bytes) => Ok(TypedValue::Bytes(bytes.clone())),
            _ => Err(mismatch()),
        },
    }
}

/// Enforce the collection postcondition: every Collection-kind property holds
/// a sequence. Nested resources are built by `convert_document`, which applies
/// the same postcondition at every level.
fn assign_empty_collections(resource: &mut TypedResource, resource_type: &ResourceType) {
    for property in &resource_type.properties {
        if property.is_collection() && resource.get(&property.name).is_none() {
            resource.set(&property.name, TypedValue::Array(Vec::new()));
        }
    }
}

fn typed_to_raw(value: &TypedValue) -> DocumentValue {
    match value {
        TypedValue::Bool(b) => DocumentValue::Bool(*b),
        TypedValue::Int(i) => DocumentValue::Int(*i),
        TypedValue::Float(f) => DocumentValue::Float(*f),
        TypedValue::String(s) => DocumentValue::String(s.clone()),
        TypedValue::DateTime(dt) => DocumentValue::DateTime(*dt),
        TypedValue::TimeSpan(ts) => DocumentValue::TimeSpan(*ts),
        TypedValue::Guid(guid) => DocumentValue::Guid(*guid),
        TypedValue::Bytes(bytes) => DocumentValue::Bytes(bytes.clone()),
        TypedValue::Array(items) => {
            DocumentValue::Array(items.iter().map(typed_to_raw).collect())
        }
        TypedValue::Resource(resource) => {
            let mut document = Document::new();
            for (name, value) in resource.values() {
                document.set(name.to_string(), typed_to_raw(value));
            }
            DocumentValue::Object(document)
        }
    }
}
