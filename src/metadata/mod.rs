//! Metadata cache and registry.
//!
//! The [`MetadataCache`] holds the accumulating inferred schema for one
//! logical connection: resource types, resource sets, the provider-type
//! registry and the generated-type registry. Caches live in a
//! [`MetadataRegistry`] keyed by connection identity; the registry is an
//! explicit object owned by the composition root, not ambient global state.
//!
//! # Isolation
//!
//! Mutation is serialized by the `Mutex` wrapping each cache. Consumers never
//! read the live cache during conversion: they take a [`MetadataSnapshot`]
//! (a deep clone), which stays valid and immutable for as long as its holder
//! uses it, even across a registry reset.

mod provider;

pub use provider::SchemaProvider;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::schema::{
    CollectionElement, NativeKind, PropertyKind, PropertyType, ResourceKind, ResourceProperty,
    ResourceSet, ResourceType, SetState, TypeShape,
};

/// Result type for schema resolution.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Schema resolution errors: the requested type or set does not exist in the
/// consulted snapshot. Surfaced to the caller, never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("unknown resource set: {0}")]
    UnknownResourceSet(String),
}

/// The accumulating inferred schema for one connection.
///
/// All mutating operations are widening-only: properties and types are added
/// or extended, never removed or narrowed. The only way to drop state is a
/// registry-level [`MetadataRegistry::reset`].
#[derive(Debug, Default)]
pub struct MetadataCache {
    types: HashMap<String, ResourceType>,
    sets: HashMap<String, ResourceSet>,
    /// `"TypeName.PropertyName"` -> native kind first observed. Append-only.
    provider_types: HashMap<String, NativeKind>,
    /// Qualified complex-type name -> memoized materialized shape.
    generated_types: HashMap<String, Arc<TypeShape>>,
}

impl MetadataCache {
    pub fn new() -> MetadataCache {
        MetadataCache::default()
    }

    pub fn resolve_resource_type(&self, qualified_name: &str) -> Option<&ResourceType> {
        self.types.get(qualified_name)
    }

    pub fn resolve_resource_set(&self, name: &str) -> Option<&ResourceSet> {
        self.sets.get(name)
    }

    /// Ensure an entity type with the given name exists.
    pub fn add_entity_type(&mut self, name: &str) {
        self.types
            .entry(name.to_string())
            .or_insert_with(|| ResourceType::new(name, ResourceKind::Entity));
    }

    /// Ensure a complex type with the given qualified name exists.
    pub fn add_complex_type(&mut self, qualified_name: &str) {
        self.types
            .entry(qualified_name.to_string())
            .or_insert_with(|| ResourceType::new(qualified_name, ResourceKind::Complex));
    }

    /// Register the key property of an entity type.
    ///
    /// If the type already carries a key, the property registers as a regular
    /// nullable primitive instead.
    pub fn add_key_property(
        &mut self,
        type_name: &str,
        property_name: &str,
        value_type: PropertyType,
    ) {
        if let Some(ty) = self.types.get_mut(type_name) {
            ty.push_property(ResourceProperty {
                name: property_name.to_string(),
                kind: PropertyKind::Key { value_type },
            });
        }
    }

    /// Register a scalar property. Non-key primitives are always nullable.
    pub fn add_primitive_property(
        &mut self,
        type_name: &str,
        property_name: &str,
        value_type: PropertyType,
    ) {
        if let Some(ty) = self.types.get_mut(type_name) {
            ty.push_property(ResourceProperty {
                name: property_name.to_string(),
                kind: PropertyKind::Primitive {
                    value_type,
                    nullable: true,
                },
            });
        }
    }

    /// Register a nested-object property referencing a complex type by name.
    pub fn add_complex_property(&mut self, type_name: &str, property_name: &str, nested_type: &str) {
        if let Some(ty) = self.types.get_mut(type_name) {
            ty.push_property(ResourceProperty {
                name: property_name.to_string(),
                kind: PropertyKind::Complex {
                    type_name: nested_type.to_string(),
                },
            });
        }
    }

    /// Register a collection property with the given element type.
    pub fn add_collection_property(
        &mut self,
        type_name: &str,
        property_name: &str,
        element: CollectionElement,
    ) {
        if let Some(ty) = self.types.get_mut(type_name) {
            ty.push_property(ResourceProperty {
                name: property_name.to_string(),
                kind: PropertyKind::Collection { element },
            });
        }
    }

    /// Register the resource set exposing an entity type.
    pub fn add_resource_set(&mut self, name: &str, type_name: &str) {
        self.sets.entry(name.to_string()).or_insert_with(|| ResourceSet {
            name: name.to_string(),
            type_name: type_name.to_string(),
            state: SetState::Sampling,
        });
    }

    pub fn set_state(&mut self, set_name: &str, state: SetState) {
        if let Some(set) = self.sets.get_mut(set_name) {
            set.state = state;
        }
    }

    /// Mark every resource set stable; called at the end of a build pass.
    pub fn mark_all_stable(&mut self) {
        for set in self.sets.values_mut() {
            set.state = SetState::Stable;
        }
    }

    /// Record the native kind observed for a qualified property name.
    /// First write wins; later observations never overwrite.
    pub fn add_provider_type(&mut self, qualified_property: &str, native: NativeKind) {
        self.provider_types
            .entry(qualified_property.to_string())
            .or_insert(native);
    }

    pub fn provider_type(&self, qualified_property: &str) -> Option<NativeKind> {
        self.provider_types.get(qualified_property).copied()
    }

    pub fn provider_types(&self) -> &HashMap<String, NativeKind> {
        &self.provider_types
    }

    pub fn generated_type(&self, qualified_name: &str) -> Option<Arc<TypeShape>> {
        self.generated_types.get(qualified_name).cloned()
    }

    pub fn insert_generated_type(&mut self, qualified_name: &str, shape: Arc<TypeShape>) {
        self.generated_types.insert(qualified_name.to_string(), shape);
    }

    /// Clone a stable, immutable view of the resolved schema for a consumer.
    pub fn clone_snapshot(&self) -> MetadataSnapshot {
        MetadataSnapshot {
            types: self.types.clone(),
            sets: self.sets.clone(),
        }
    }
}

/// An immutable, deep-cloned view of a cache's resolved schema.
///
/// The only way a consumer obtains a schema. A snapshot never changes, even
/// while the live cache keeps widening.
#[derive(Debug, Clone)]
pub struct MetadataSnapshot {
    types: HashMap<String, ResourceType>,
    sets: HashMap<String, ResourceSet>,
}

impl MetadataSnapshot {
    pub fn resolve_resource_type(&self, qualified_name: &str) -> Option<&ResourceType> {
        self.types.get(qualified_name)
    }

    pub fn resolve_resource_set(&self, name: &str) -> Option<&ResourceSet> {
        self.sets.get(name)
    }

    pub fn resource_type(&self, qualified_name: &str) -> MetadataResult<&ResourceType> {
        self.resolve_resource_type(qualified_name)
            .ok_or_else(|| MetadataError::UnknownResourceType(qualified_name.to_string()))
    }

    pub fn resource_set(&self, name: &str) -> MetadataResult<&ResourceSet> {
        self.resolve_resource_set(name)
            .ok_or_else(|| MetadataError::UnknownResourceSet(name.to_string()))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}

/// Table of per-connection metadata caches.
///
/// Owned by the composition root and handed by reference to every component
/// that needs schema state. `reset` affects the table itself and therefore
/// takes the coarser registry lock; per-cache mutation only takes the cache's
/// own mutex.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    caches: Mutex<HashMap<String, Arc<Mutex<MetadataCache>>>>,
}

impl MetadataRegistry {
    pub fn new() -> MetadataRegistry {
        MetadataRegistry::default()
    }

    /// Get or create the cache for a connection identity.
    pub fn cache_for(&self, connection_id: &str) -> Arc<Mutex<MetadataCache>> {
        let mut caches = self.caches.lock().unwrap_or_else(PoisonError::into_inner);
        caches
            .entry(connection_id.to_string())
            .or_insert_with(|| {
                log::info!("creating metadata cache for connection `{}`", connection_id);
                Arc::new(Mutex::new(MetadataCache::new()))
            })
            .clone()
    }

    pub fn contains(&self, connection_id: &str) -> bool {
        self.caches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(connection_id)
    }

    /// Drop all cached schemas for all connections.
    ///
    /// The next `cache_for` call observes the cleared table immediately and
    /// forces full re-inference. Snapshots already cloned by consumers remain
    /// valid for their holders.
    pub fn reset(&self) {
        let mut caches = self.caches.lock().unwrap_or_else(PoisonError::into_inner);
        let dropped = caches.len();
        caches.clear();
        log::info!("metadata registry reset, dropped {} cache(s)", dropped);
    }
}
