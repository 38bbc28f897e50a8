//! Naming and qualification rules for inferred types and properties.
//!
//! All names flowing into the resource model pass through these functions, so
//! normalization stays in one place and is trivially idempotent.

use super::ResourceKind;

/// Field name treated as the natural identifier of a document.
pub const PROVIDER_ID_NAME: &str = "id";

/// Property name the identifier field is exposed under in the resource model.
pub const MAPPED_ID_NAME: &str = "id";

/// Separator joining an owner type name with a nested property name.
pub const WORD_SEPARATOR: &str = "__";

/// Prefix applied to names whose leading character is not a valid leading
/// identifier character in the target model.
pub const INVALID_LEADING_CHAR_PREFIX: &str = "x";

/// Whether a field case-insensitively matches the reserved identifier name.
pub fn is_object_id(field_name: &str) -> bool {
    field_name.eq_ignore_ascii_case(PROVIDER_ID_NAME)
}

/// Normalize a source field name into a model property name.
///
/// Trims surrounding whitespace and prefixes names starting with an
/// underscore. Idempotent: normalizing a normalized name is a no-op.
pub fn normalize_property_name(field_name: &str) -> String {
    let trimmed = field_name.trim();
    if trimmed.starts_with('_') {
        format!("{}{}", INVALID_LEADING_CHAR_PREFIX, trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Resolve the model property name for a source field.
///
/// The identifier field maps to [`MAPPED_ID_NAME`] on entity types; complex
/// types carry no identity, so an `id` field nested inside one is just a
/// normalized regular property.
pub fn resource_property_name(field_name: &str, owner_kind: ResourceKind) -> String {
    if is_object_id(field_name) && owner_kind != ResourceKind::Complex {
        MAPPED_ID_NAME.to_string()
    } else {
        normalize_property_name(field_name)
    }
}

/// Qualified name for a nested complex type.
///
/// Joins the owner path with the property name, unless global complex-type
/// names are enabled, in which case the bare property name is reused verbatim
/// (cross-collection collisions accepted by configuration).
pub fn qualified_type_name(owner_name: &str, property_name: &str, global_names: bool) -> String {
    if global_names {
        property_name.to_string()
    } else {
        format!("{}{}{}", owner_name, WORD_SEPARATOR, property_name)
    }
}

/// Qualified key for the provider-type registry: `TypeName.PropertyName`.
pub fn qualified_property_name(type_name: &str, property_name: &str) -> String {
    format!("{}.{}", type_name, property_name)
}
