//! The inferred resource model.
//!
//! Documents are exposed through a statically-typed model: every sampled
//! collection becomes an Entity [`ResourceType`] with a [`ResourceSet`], and
//! nested objects become Complex resource types. Inference only ever widens a
//! type: properties are added, never removed or narrowed.

pub mod naming;
pub mod resolver;

use std::sync::Arc;

/// Semantic type of a scalar property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    String,
    Boolean,
    Int64,
    Float64,
    DateTime,
    TimeSpan,
    Guid,
    Bytes,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Boolean => "boolean",
            PropertyType::Int64 => "int64",
            PropertyType::Float64 => "float64",
            PropertyType::DateTime => "datetime",
            PropertyType::TimeSpan => "timespan",
            PropertyType::Guid => "guid",
            PropertyType::Bytes => "bytes",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native kind of a raw field value as last observed by the sampler.
///
/// Recorded in the provider-type registry and consumed by the dynamic type
/// materializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKind {
    Scalar(PropertyType),
    Object,
    Array,
}

/// Whether a resource type is backed by its own set and key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Top-level type with a resource set and a key property.
    Entity,
    /// Nested object type with no independent identity.
    Complex,
}

/// Element type of a collection property.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionElement {
    Scalar(PropertyType),
    /// Qualified name of the shared nested complex type.
    Complex(String),
}

/// Kind and value type of a declared property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// Entity identifier. Never nullable.
    Key { value_type: PropertyType },
    Primitive {
        value_type: PropertyType,
        nullable: bool,
    },
    /// Nested object; `type_name` is the qualified name of the complex type.
    Complex { type_name: String },
    Collection { element: CollectionElement },
}

/// A single declared property of a resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceProperty {
    /// Normalized property name, unique within the owning type.
    pub name: String,
    pub kind: PropertyKind,
}

impl ResourceProperty {
    pub fn is_key(&self) -> bool {
        matches!(self.kind, PropertyKind::Key { .. })
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.kind, PropertyKind::Complex { .. })
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, PropertyKind::Collection { .. })
    }
}

/// An inferred resource type: the typed shape of a document or nested object.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceType {
    /// Qualified type name (collection name, or owner path joined with the
    /// word separator for nested types).
    pub name: String,
    pub kind: ResourceKind,
    /// Declared properties in registration order, unique by name.
    pub properties: Vec<ResourceProperty>,
    /// Name of the key property, if one has been assigned (Entity only).
    pub key: Option<String>,
}

impl ResourceType {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> ResourceType {
        ResourceType {
            name: name.into(),
            kind,
            properties: Vec::new(),
            key: None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&ResourceProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Add a property if no property with the same name exists yet.
    ///
    /// Widening-only: a second registration under an existing name is ignored,
    /// which keeps Complex/Collection properties from ever being re-typed. A
    /// Key property registered after a key has already been assigned is
    /// demoted to a nullable primitive, keeping the at-most-one-key invariant.
    pub(crate) fn push_property(&mut self, mut property: ResourceProperty) {
        if self.property(&property.name).is_some() {
            return;
        }
        if let PropertyKind::Key { value_type } = property.kind {
            if self.key.is_none() {
                self.key = Some(property.name.clone());
            } else {
                property.kind = PropertyKind::Primitive {
                    value_type,
                    nullable: true,
                };
            }
        }
        self.properties.push(property);
    }
}

/// The named, queryable collection exposed for an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSet {
    /// Collection name.
    pub name: String,
    /// Qualified name of the backing entity type.
    pub type_name: String,
    pub state: SetState,
}

/// Sampling state of a resource set.
///
/// A set is `Sampling` while a build pass or an incremental registration is
/// extending its type, and `Stable` otherwise. `Stable` re-enters `Sampling`
/// only through the dynamic-update registration path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetState {
    Sampling,
    Stable,
}

/// Materialized field-shape descriptor for a complex type.
///
/// Produced on demand by the dynamic type materializer and interpreted by the
/// typed query path; no runtime code generation is involved.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeShape {
    /// Qualified type name.
    pub name: String,
    pub fields: Vec<FieldShape>,
}

/// One field of a materialized type shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    pub name: String,
    pub native: NativeKind,
    /// Shape of the nested type for object-kinded fields, when dynamic
    /// materialization of complex types is enabled.
    pub nested: Option<Arc<TypeShape>>,
}
