//! Schema builder: sampling collections into the metadata cache.
//!
//! A [`SchemaSampler`] drives one build pass: it streams a bounded sample of
//! each collection's documents through the type resolver and registers or
//! extends entity and complex types in the cache. Inference never rejects a
//! document; every ambiguity is resolved by widening or fallback.
//!
//! Per collection the pass moves through `Sampling` (document i of N) into
//! `Finalizing` (remaining unresolved properties flushed to string) and ends
//! `Stable`. A stable set re-enters `Sampling` only through the incremental
//! registration entry point used when dynamic updates are enabled.
//!
//! The caller is expected to hold the cache's mutex for the whole pass; the
//! sampler itself borrows the cache mutably and is free of interior locking.

mod unresolved;

pub use unresolved::{UnresolvedProperties, UnresolvedProperty};

use crate::config::MetadataConfig;
use crate::document::{Document, DocumentValue};
use crate::metadata::MetadataCache;
use crate::schema::naming;
use crate::schema::resolver::{self, ValueClass};
use crate::schema::{CollectionElement, NativeKind, PropertyKind, PropertyType, ResourceKind};
use crate::store::{DocumentStore, StoreResult};

/// Collections carrying this prefix are store-internal and never sampled.
const SYSTEM_COLLECTION_PREFIX: &str = "system.";

/// One schema-build pass against a metadata cache.
pub struct SchemaSampler<'a> {
    cache: &'a mut MetadataCache,
    config: &'a MetadataConfig,
    unresolved: UnresolvedProperties,
}

impl<'a> SchemaSampler<'a> {
    pub fn new(cache: &'a mut MetadataCache, config: &'a MetadataConfig) -> SchemaSampler<'a> {
        SchemaSampler {
            cache,
            config,
            unresolved: UnresolvedProperties::new(),
        }
    }

    /// Populate the cache from every collection in the store, under the
    /// configured sampling policy, then finalize the pass.
    pub fn populate(&mut self, store: &dyn DocumentStore) -> StoreResult<()> {
        for collection in store.list_collection_names()? {
            if collection.starts_with(SYSTEM_COLLECTION_PREFIX) {
                continue;
            }
            if self.config.prefetch_rows == 0 {
                if self.cache.resolve_resource_set(&collection).is_none() {
                    self.add_resource_set(&collection, None);
                }
            } else {
                self.populate_from_collection(store, &collection)?;
            }
        }
        self.finalize();
        Ok(())
    }

    fn populate_from_collection(
        &mut self,
        store: &dyn DocumentStore,
        collection: &str,
    ) -> StoreResult<()> {
        let order = self.config.fetch_position.scan_order();
        let documents = store.enumerate_documents(collection, order)?;

        let mut sampled = 0i64;
        for document in documents {
            let known_type = self
                .cache
                .resolve_resource_set(collection)
                .map(|set| set.type_name.clone());
            match known_type {
                None => self.add_resource_set(collection, Some(&document)),
                Some(type_name) => self.register_document(&type_name, &document),
            }

            sampled += 1;
            // Bounded sample: stop pulling the lazy sequence, never drain it.
            if self.config.prefetch_rows >= 0 && sampled >= self.config.prefetch_rows {
                break;
            }
        }
        log::debug!("sampled {} document(s) from collection `{}`", sampled, collection);
        Ok(())
    }

    /// End the pass: force-type every still-unresolved property to string so
    /// each declared property has a concrete type, and mark all sets stable.
    pub fn finalize(&mut self) {
        for entry in self.unresolved.drain() {
            let property_name = naming::normalize_property_name(&entry.property_name);
            log::debug!(
                "property `{}.{}` stayed null through the pass, falling back to string",
                entry.type_name,
                property_name
            );
            self.cache
                .add_primitive_property(&entry.type_name, &property_name, PropertyType::String);
            self.cache.add_provider_type(
                &naming::qualified_property_name(&entry.type_name, &property_name),
                NativeKind::Scalar(PropertyType::String),
            );
        }
        self.cache.mark_all_stable();
    }

    /// Register every field of a document against an existing type.
    ///
    /// Incremental registration entry point: also used after the initial pass
    /// when dynamic updates feed converted documents back into the builder.
    pub fn register_document(&mut self, type_name: &str, document: &Document) {
        for (field, value) in document.fields() {
            self.register_field(type_name, field, value);
        }
    }

    /// Register a single raw field against an existing type.
    ///
    /// New fields register as new properties; fields already declared as
    /// Complex or Collection recurse into their structure so later documents
    /// can widen nested types.
    pub fn register_field(&mut self, type_name: &str, field_name: &str, value: &DocumentValue) {
        let Some(kind) = self.type_kind(type_name) else {
            return;
        };
        let property_name = naming::resource_property_name(field_name, kind);
        let existing = self
            .cache
            .resolve_resource_type(type_name)
            .and_then(|ty| ty.property(&property_name))
            .map(|p| p.kind.clone());

        match existing {
            None => self.register_resource_property(type_name, field_name, value),
            Some(PropertyKind::Complex { type_name: nested }) if !value.is_null() => {
                if let DocumentValue::Object(document) = value {
                    self.register_document(&nested, document);
                }
            }
            Some(PropertyKind::Collection { .. }) if !value.is_null() => {
                self.register_array_property(type_name, field_name, value);
            }
            _ => {}
        }
    }

    fn add_resource_set(&mut self, collection: &str, document: Option<&Document>) {
        self.add_document_type(collection, document, ResourceKind::Entity);
        self.cache.add_resource_set(collection, collection);
    }

    /// Create (or extend) a type from a document's fields.
    ///
    /// When no natural identifier field is present, entity types get a
    /// surrogate string key and both kinds record a provider-type entry for
    /// the identifier.
    fn add_document_type(
        &mut self,
        qualified_name: &str,
        document: Option<&Document>,
        kind: ResourceKind,
    ) {
        match kind {
            ResourceKind::Entity => self.cache.add_entity_type(qualified_name),
            ResourceKind::Complex => self.cache.add_complex_type(qualified_name),
        }

        let mut has_object_id = false;
        if let Some(document) = document {
            for (field, value) in document.fields() {
                self.register_resource_property(qualified_name, field, value);
                if naming::is_object_id(field) {
                    has_object_id = true;
                }
            }
        }

        if !has_object_id {
            if kind == ResourceKind::Entity {
                self.cache.add_key_property(
                    qualified_name,
                    naming::MAPPED_ID_NAME,
                    PropertyType::String,
                );
            }
            self.cache.add_provider_type(
                &naming::qualified_property_name(qualified_name, naming::PROVIDER_ID_NAME),
                NativeKind::Scalar(PropertyType::String),
            );
        }
    }

    /// Register a not-yet-declared field, tracking it while its type is
    /// undetermined.
    fn register_resource_property(
        &mut self,
        type_name: &str,
        field_name: &str,
        value: &DocumentValue,
    ) {
        let Some(kind) = self.type_kind(type_name) else {
            return;
        };
        let property_name = naming::resource_property_name(field_name, kind);
        if self.property_exists(type_name, &property_name) {
            return;
        }

        let marker = UnresolvedProperty::new(type_name, field_name);
        let unresolved_earlier = self.unresolved.contains(&marker);
        let resolved_now = resolver::native_kind(value).is_some();

        if !unresolved_earlier && !resolved_now {
            self.unresolved.insert(marker);
        } else if unresolved_earlier && resolved_now {
            self.unresolved.remove(&marker);
        }

        if resolved_now {
            self.add_resource_property(type_name, field_name, value);
        }
    }

    fn add_resource_property(&mut self, type_name: &str, field_name: &str, value: &DocumentValue) {
        let Some(kind) = self.type_kind(type_name) else {
            return;
        };
        let property_name = naming::resource_property_name(field_name, kind);
        if property_name.is_empty() {
            return;
        }
        let is_id = naming::is_object_id(field_name);

        if is_id {
            if kind == ResourceKind::Entity {
                // Natural key candidate; the cache demotes it to a primitive
                // if a key has already been assigned.
                self.cache
                    .add_key_property(type_name, &property_name, PropertyType::String);
            } else if let Some(value_type) = resolver::scalar_type(value) {
                self.cache
                    .add_primitive_property(type_name, &property_name, value_type);
            }
        } else {
            match resolver::classify(value) {
                ValueClass::Object => {
                    if let DocumentValue::Object(document) = value {
                        self.add_object_property(type_name, &property_name, document, false);
                    }
                }
                ValueClass::Array => self.register_array_property(type_name, field_name, value),
                ValueClass::Scalar(value_type) => {
                    self.cache
                        .add_primitive_property(type_name, &property_name, value_type)
                }
                ValueClass::Unresolved => return,
            }
        }

        let provider_name = if is_id {
            naming::PROVIDER_ID_NAME
        } else {
            property_name.as_str()
        };
        if let Some(native) = resolver::native_kind(value) {
            self.cache.add_provider_type(
                &naming::qualified_property_name(type_name, provider_name),
                native,
            );
        }
    }

    /// Register or extend the nested complex type behind an object-valued
    /// field, then declare the owning property as Complex (or Collection when
    /// the object came from an array element).
    fn add_object_property(
        &mut self,
        owner_type: &str,
        property_name: &str,
        document: &Document,
        is_collection: bool,
    ) {
        let nested_name = naming::qualified_type_name(
            owner_type,
            property_name,
            self.config.use_global_complex_type_names,
        );
        if self.cache.resolve_resource_type(&nested_name).is_none() {
            self.add_document_type(&nested_name, Some(document), ResourceKind::Complex);
        } else {
            // The nested shape was seen before: widen it field by field.
            self.register_document(&nested_name, document);
        }

        if is_collection {
            self.cache.add_collection_property(
                owner_type,
                property_name,
                CollectionElement::Complex(nested_name),
            );
        } else {
            self.cache
                .add_complex_property(owner_type, property_name, &nested_name);
        }
    }

    /// Register a collection property from an array-valued field.
    ///
    /// Object elements share one nested complex type, widened per element.
    /// For scalar elements the first non-null element's type wins; later
    /// conflicting elements are not reconciled. Arrays nested inside arrays
    /// are not representable in the target model and their elements are
    /// skipped.
    fn register_array_property(&mut self, type_name: &str, field_name: &str, value: &DocumentValue) {
        let DocumentValue::Array(items) = value else {
            return;
        };
        let property_name = naming::resource_property_name(field_name, ResourceKind::Entity);

        for item in items {
            match item {
                DocumentValue::Null | DocumentValue::Array(_) => continue,
                DocumentValue::Object(document) => {
                    self.add_object_property(type_name, &property_name, document, true);
                }
                scalar => {
                    if !self.property_exists(type_name, &property_name) {
                        if let Some(value_type) = resolver::scalar_type(scalar) {
                            self.cache.add_collection_property(
                                type_name,
                                &property_name,
                                CollectionElement::Scalar(value_type),
                            );
                            self.cache.add_provider_type(
                                &naming::qualified_property_name(type_name, &property_name),
                                NativeKind::Array,
                            );
                        }
                    }
                }
            }
        }
    }

    fn type_kind(&self, type_name: &str) -> Option<ResourceKind> {
        self.cache.resolve_resource_type(type_name).map(|ty| ty.kind)
    }

    fn property_exists(&self, type_name: &str, property_name: &str) -> bool {
        self.cache
            .resolve_resource_type(type_name)
            .and_then(|ty| ty.property(property_name))
            .is_some()
    }
}
