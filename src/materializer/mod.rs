//! Dynamic type materialization.
//!
//! Turns a complex type's resolved property set into a concrete
//! [`TypeShape`] descriptor for the typed/queryable access path. The shape is
//! derived from the provider-type registry — every entry whose qualified key
//! is prefixed by the type name contributes one field — and memoized in the
//! cache's generated-type registry so identical shapes are never rebuilt.
//! The in-memory access path does not use shapes at all.

use std::sync::Arc;

use crate::config::MetadataConfig;
use crate::metadata::MetadataCache;
use crate::schema::{naming, FieldShape, NativeKind, TypeShape};

/// Materialize (or fetch the memoized) shape descriptor for a qualified type
/// name.
pub fn materialize(
    cache: &mut MetadataCache,
    qualified_name: &str,
    config: &MetadataConfig,
) -> Arc<TypeShape> {
    let mut visiting = Vec::new();
    materialize_inner(cache, qualified_name, config, &mut visiting)
}

fn materialize_inner(
    cache: &mut MetadataCache,
    qualified_name: &str,
    config: &MetadataConfig,
    visiting: &mut Vec<String>,
) -> Arc<TypeShape> {
    if let Some(shape) = cache.generated_type(qualified_name) {
        return shape;
    }

    let prefix = format!("{}.", qualified_name);
    let mut entries: Vec<(String, NativeKind)> = cache
        .provider_types()
        .iter()
        .filter_map(|(key, native)| {
            key.strip_prefix(&prefix)
                .map(|field| (field.to_string(), *native))
        })
        .collect();
    // HashMap iteration order is arbitrary; shapes must be deterministic.
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    visiting.push(qualified_name.to_string());
    let fields = entries
        .into_iter()
        .map(|(field, native)| {
            let nested = match native {
                NativeKind::Object if config.create_dynamic_types_for_complex_types => {
                    let nested_name = naming::qualified_type_name(
                        qualified_name,
                        &field,
                        config.use_global_complex_type_names,
                    );
                    // Global type names can alias a shape to itself; leave
                    // such fields opaque instead of recursing forever.
                    if visiting.contains(&nested_name) {
                        None
                    } else {
                        Some(materialize_inner(cache, &nested_name, config, visiting))
                    }
                }
                _ => None,
            };
            FieldShape {
                name: field,
                native,
                nested,
            }
        })
        .collect();
    visiting.pop();

    let shape = Arc::new(TypeShape {
        name: qualified_name.to_string(),
        fields,
    });
    cache.insert_generated_type(qualified_name, shape.clone());
    shape
}
