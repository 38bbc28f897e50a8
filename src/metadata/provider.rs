//! SchemaProvider: the surface exposed to the outer protocol layer.
//!
//! A provider ties together one document store, one metadata cache obtained
//! from the registry, and the configured sampling policy. Construction runs
//! the initial schema-build pass; afterwards the provider serves schema
//! lookups, conversions and incremental field registration.
//!
//! All work happens synchronously on the caller's thread. The provider locks
//! the cache only around mutation (sampling, registration) and snapshotting;
//! conversion itself runs against an immutable snapshot.

use std::sync::{Arc, Mutex, PoisonError};

use crate::config::MetadataConfig;
use crate::convert::{self, ConvertResult, TypedResource};
use crate::document::{Document, DocumentValue};
use crate::materializer;
use crate::sampler::SchemaSampler;
use crate::schema::{ResourceSet, ResourceType, SetState, TypeShape};
use crate::store::{DocumentStore, StoreResult};

use super::{MetadataCache, MetadataRegistry, MetadataSnapshot};

/// Typed access to a document store under an inferred, evolving schema.
pub struct SchemaProvider<S> {
    store: S,
    config: MetadataConfig,
    cache: Arc<Mutex<MetadataCache>>,
}

impl<S: DocumentStore> SchemaProvider<S> {
    /// Create a provider for a connection identity and run the initial
    /// schema-build pass under the configured sampling policy.
    pub fn connect(
        registry: &MetadataRegistry,
        connection_id: &str,
        store: S,
        config: MetadataConfig,
    ) -> StoreResult<SchemaProvider<S>> {
        let cache = registry.cache_for(connection_id);
        let provider = SchemaProvider {
            store,
            config,
            cache,
        };
        provider.refresh()?;
        Ok(provider)
    }

    /// Run a schema-build pass against the live cache.
    ///
    /// Idempotent for an unchanged store; for a changed store it widens the
    /// schema with whatever the new sample reveals.
    pub fn refresh(&self) -> StoreResult<()> {
        let mut cache = self.lock_cache();
        let mut sampler = SchemaSampler::new(&mut cache, &self.config);
        sampler.populate(&self.store)
    }

    /// Clone a stable snapshot of the resolved schema.
    pub fn snapshot(&self) -> MetadataSnapshot {
        self.lock_cache().clone_snapshot()
    }

    pub fn resolve_resource_type(&self, qualified_name: &str) -> Option<ResourceType> {
        self.lock_cache().resolve_resource_type(qualified_name).cloned()
    }

    pub fn resolve_resource_set(&self, name: &str) -> Option<ResourceSet> {
        self.lock_cache().resolve_resource_set(name).cloned()
    }

    /// Convert a raw document into a typed resource of the named resource.
    ///
    /// With dynamic updates enabled, fields the initial sample never saw are
    /// first fed back through the schema builder's registration entry point,
    /// so the conversion below already sees them as declared properties.
    pub fn to_resource(
        &self,
        document: &Document,
        resource_name: &str,
    ) -> ConvertResult<TypedResource> {
        if self.config.update_dynamically {
            self.register_document(resource_name, document);
        }
        let snapshot = self.snapshot();
        convert::to_resource(&snapshot, document, resource_name)
    }

    /// Convert a typed resource back into a sparse raw document.
    pub fn to_document(
        &self,
        resource: &TypedResource,
        resource_name: &str,
    ) -> ConvertResult<Document> {
        let snapshot = self.snapshot();
        convert::to_document(&snapshot, resource, resource_name)
    }

    /// Incrementally register a single field against a resource's type.
    ///
    /// A null value resolves nothing and leaves the schema untouched; the
    /// field appears once a later call supplies a non-null value.
    pub fn register_field(&self, resource_name: &str, field_name: &str, value: &DocumentValue) {
        let mut cache = self.lock_cache();
        let Some(type_name) = cache
            .resolve_resource_set(resource_name)
            .map(|set| set.type_name.clone())
        else {
            return;
        };
        cache.set_state(resource_name, SetState::Sampling);
        let mut sampler = SchemaSampler::new(&mut cache, &self.config);
        sampler.register_field(&type_name, field_name, value);
        cache.set_state(resource_name, SetState::Stable);
    }

    /// Register every field of a document against a resource's type.
    pub fn register_document(&self, resource_name: &str, document: &Document) {
        let mut cache = self.lock_cache();
        let Some(type_name) = cache
            .resolve_resource_set(resource_name)
            .map(|set| set.type_name.clone())
        else {
            return;
        };
        cache.set_state(resource_name, SetState::Sampling);
        let mut sampler = SchemaSampler::new(&mut cache, &self.config);
        sampler.register_document(&type_name, document);
        cache.set_state(resource_name, SetState::Stable);
    }

    /// Materialize (or fetch the memoized) shape descriptor for a qualified
    /// complex-type name.
    pub fn materialize(&self, qualified_name: &str) -> Arc<TypeShape> {
        let mut cache = self.lock_cache();
        materializer::materialize(&mut cache, qualified_name, &self.config)
    }

    pub fn config(&self) -> &MetadataConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, MetadataCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
