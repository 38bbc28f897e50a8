//! Schema-build pass tests: sampling policies, widening, unresolved fallback.

use docmodel::config::{FetchPosition, MetadataConfig};
use docmodel::document::DocumentValue;
use docmodel::metadata::MetadataCache;
use docmodel::sampler::SchemaSampler;
use docmodel::schema::{CollectionElement, PropertyKind, PropertyType};
use docmodel::store::MemoryStore;
use serde_json::json;

fn sample(store: &MemoryStore, config: &MetadataConfig) -> MetadataCache {
    let mut cache = MetadataCache::new();
    SchemaSampler::new(&mut cache, config)
        .populate(store)
        .unwrap();
    cache
}

fn property_kind(cache: &MetadataCache, type_name: &str, property: &str) -> PropertyKind {
    cache
        .resolve_resource_type(type_name)
        .unwrap_or_else(|| panic!("missing type {type_name}"))
        .property(property)
        .unwrap_or_else(|| panic!("missing property {type_name}.{property}"))
        .kind
        .clone()
}

#[test]
fn test_schema_is_union_of_sampled_fields() {
    let mut store = MemoryStore::new();
    store.insert_json("users", json!({"name": "Ann"})).unwrap();
    store.insert_json("users", json!({"age": 34})).unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    let ty = cache.resolve_resource_type("users").unwrap();

    assert_eq!(
        property_kind(&cache, "users", "name"),
        PropertyKind::Primitive {
            value_type: PropertyType::String,
            nullable: true,
        }
    );
    assert_eq!(
        property_kind(&cache, "users", "age"),
        PropertyKind::Primitive {
            value_type: PropertyType::Int64,
            nullable: true,
        }
    );
    // No natural identifier anywhere in the sample: surrogate string key.
    assert_eq!(ty.key.as_deref(), Some("id"));
    assert!(ty.property("id").unwrap().is_key());
}

#[test]
fn test_properties_register_in_document_order() {
    let mut store = MemoryStore::new();
    store
        .insert_json("users", json!({"zeta": 1, "alpha": "a"}))
        .unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    let names: Vec<_> = cache
        .resolve_resource_type("users")
        .unwrap()
        .properties
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    // Source field order, surrogate key appended last.
    assert_eq!(names, vec!["zeta", "alpha", "id"]);
}

#[test]
fn test_natural_id_field_becomes_key() {
    let mut store = MemoryStore::new();
    store
        .insert_json("users", json!({"Id": "u-1", "name": "Ann"}))
        .unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    let ty = cache.resolve_resource_type("users").unwrap();
    assert_eq!(ty.key.as_deref(), Some("id"));
}

#[test]
fn test_prefetch_zero_builds_surrogate_only_schema() {
    let mut store = MemoryStore::new();
    store
        .insert_json("users", json!({"name": "Ann", "age": 34}))
        .unwrap();

    let config = MetadataConfig::default().with_prefetch_rows(0);
    let cache = sample(&store, &config);

    let set = cache.resolve_resource_set("users").unwrap();
    assert_eq!(set.type_name, "users");

    let ty = cache.resolve_resource_type("users").unwrap();
    assert_eq!(ty.properties.len(), 1);
    assert_eq!(ty.key.as_deref(), Some("id"));
}

#[test]
fn test_prefetch_bounds_the_sample() {
    let mut store = MemoryStore::new();
    store.insert_json("users", json!({"a": 1})).unwrap();
    store.insert_json("users", json!({"b": 2})).unwrap();
    store.insert_json("users", json!({"c": 3})).unwrap();

    let config = MetadataConfig::default().with_prefetch_rows(2);
    let cache = sample(&store, &config);
    let ty = cache.resolve_resource_type("users").unwrap();

    assert!(ty.property("a").is_some());
    assert!(ty.property("b").is_some());
    assert!(ty.property("c").is_none());
}

#[test]
fn test_fetch_position_end_samples_the_tail() {
    let mut store = MemoryStore::new();
    store.insert_json("users", json!({"oldest": 1})).unwrap();
    store.insert_json("users", json!({"newest": 2})).unwrap();

    let config = MetadataConfig::default()
        .with_prefetch_rows(1)
        .with_fetch_position(FetchPosition::End);
    let cache = sample(&store, &config);
    let ty = cache.resolve_resource_type("users").unwrap();

    assert!(ty.property("newest").is_some());
    assert!(ty.property("oldest").is_none());
}

#[test]
fn test_system_collections_are_skipped() {
    let mut store = MemoryStore::new();
    store
        .insert_json("system.indexes", json!({"v": 1}))
        .unwrap();
    store.insert_json("users", json!({"name": "Ann"})).unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    assert!(cache.resolve_resource_set("users").is_some());
    assert!(cache.resolve_resource_set("system.indexes").is_none());
}

#[test]
fn test_all_null_field_falls_back_to_string() {
    let mut store = MemoryStore::new();
    store.insert_json("users", json!({"note": null})).unwrap();
    store.insert_json("users", json!({"note": null})).unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    assert_eq!(
        property_kind(&cache, "users", "note"),
        PropertyKind::Primitive {
            value_type: PropertyType::String,
            nullable: true,
        }
    );
}

#[test]
fn test_null_then_value_resolves_to_observed_type() {
    let mut store = MemoryStore::new();
    store.insert_json("users", json!({"score": null})).unwrap();
    store.insert_json("users", json!({"score": 9.5})).unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    assert_eq!(
        property_kind(&cache, "users", "score"),
        PropertyKind::Primitive {
            value_type: PropertyType::Float64,
            nullable: true,
        }
    );
}

#[test]
fn test_nested_object_registers_qualified_complex_type() {
    let mut store = MemoryStore::new();
    store
        .insert_json("users", json!({"address": {"city": "Oslo"}}))
        .unwrap();
    store
        .insert_json("users", json!({"address": {"zip": 1234}}))
        .unwrap();

    let cache = sample(&store, &MetadataConfig::default());

    assert_eq!(
        property_kind(&cache, "users", "address"),
        PropertyKind::Complex {
            type_name: "users__address".to_string(),
        }
    );
    // The nested type widens across documents like any other type.
    let nested = cache.resolve_resource_type("users__address").unwrap();
    assert!(nested.property("city").is_some());
    assert!(nested.property("zip").is_some());
    assert!(nested.key.is_none());
}

#[test]
fn test_global_complex_type_names() {
    let mut store = MemoryStore::new();
    store
        .insert_json("users", json!({"address": {"city": "Oslo"}}))
        .unwrap();

    let config = MetadataConfig::default().with_global_complex_type_names(true);
    let cache = sample(&store, &config);

    assert_eq!(
        property_kind(&cache, "users", "address"),
        PropertyKind::Complex {
            type_name: "address".to_string(),
        }
    );
    assert!(cache.resolve_resource_type("address").is_some());
}

#[test]
fn test_id_inside_complex_type_is_plain_property() {
    let mut store = MemoryStore::new();
    store
        .insert_json("orders", json!({"line": {"id": 7, "sku": "A"}}))
        .unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    let nested = cache.resolve_resource_type("orders__line").unwrap();
    assert!(nested.key.is_none());
    assert!(!nested.property("id").unwrap().is_key());
}

#[test]
fn test_scalar_array_first_non_null_element_wins() {
    let mut store = MemoryStore::new();
    store
        .insert_json("posts", json!({"tags": [null, "rust", 42]}))
        .unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    assert_eq!(
        property_kind(&cache, "posts", "tags"),
        PropertyKind::Collection {
            element: CollectionElement::Scalar(PropertyType::String),
        }
    );
}

#[test]
fn test_object_array_elements_share_one_widened_type() {
    let mut store = MemoryStore::new();
    store
        .insert_json(
            "orders",
            json!({"lines": [{"sku": "A"}, {"sku": "B", "qty": 2}]}),
        )
        .unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    assert_eq!(
        property_kind(&cache, "orders", "lines"),
        PropertyKind::Collection {
            element: CollectionElement::Complex("orders__lines".to_string()),
        }
    );
    let element = cache.resolve_resource_type("orders__lines").unwrap();
    assert!(element.property("sku").is_some());
    assert!(element.property("qty").is_some());
}

#[test]
fn test_array_inside_array_is_not_registered() {
    let mut store = MemoryStore::new();
    store
        .insert_json("grids", json!({"cells": [[1, 2], [3]]}))
        .unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    let ty = cache.resolve_resource_type("grids").unwrap();
    assert!(ty.property("cells").is_none());
}

#[test]
fn test_leading_underscore_field_is_prefixed() {
    let mut store = MemoryStore::new();
    store.insert_json("docs", json!({"_rev": "3-a"})).unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    let ty = cache.resolve_resource_type("docs").unwrap();
    assert!(ty.property("x_rev").is_some());
    assert!(ty.property("_rev").is_none());
}

#[test]
fn test_structured_field_never_narrows_to_scalar() {
    let mut store = MemoryStore::new();
    store
        .insert_json("users", json!({"address": {"city": "Oslo"}}))
        .unwrap();
    store
        .insert_json("users", json!({"address": "unknown"}))
        .unwrap();

    let cache = sample(&store, &MetadataConfig::default());
    assert!(matches!(
        property_kind(&cache, "users", "address"),
        PropertyKind::Complex { .. }
    ));
}

#[test]
fn test_incremental_register_field_with_null_is_noop() {
    let mut store = MemoryStore::new();
    store.insert_json("users", json!({"name": "Ann"})).unwrap();

    let config = MetadataConfig::default();
    let mut cache = sample(&store, &config);

    let mut sampler = SchemaSampler::new(&mut cache, &config);
    sampler.register_field("users", "ghost", &DocumentValue::Null);
    drop(sampler);

    assert!(cache
        .resolve_resource_type("users")
        .unwrap()
        .property("ghost")
        .is_none());
}
