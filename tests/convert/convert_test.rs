//! Document ↔ typed-resource conversion tests.

use chrono::Duration;
use docmodel::config::MetadataConfig;
use docmodel::convert::{self, ConvertError, TypedValue};
use docmodel::document::{Document, DocumentValue};
use docmodel::metadata::{MetadataCache, MetadataSnapshot};
use docmodel::sampler::SchemaSampler;
use docmodel::schema::PropertyType;
use docmodel::store::MemoryStore;
use serde_json::json;

/// Sample the store with defaults and hand back the resolved schema.
fn snapshot_of(store: &MemoryStore) -> MetadataSnapshot {
    let config = MetadataConfig::default();
    let mut cache = MetadataCache::new();
    SchemaSampler::new(&mut cache, &config)
        .populate(store)
        .unwrap();
    cache.clone_snapshot()
}

fn doc(value: serde_json::Value) -> Document {
    Document::from_json(value).unwrap()
}

#[test]
fn test_scalar_conversion() {
    let mut store = MemoryStore::new();
    store
        .insert_json("users", json!({"id": "u-1", "name": "Ann", "age": 34, "active": true}))
        .unwrap();
    let snapshot = snapshot_of(&store);

    let resource = convert::to_resource(
        &snapshot,
        &doc(json!({"id": "u-2", "name": "Bo", "age": 51, "active": false})),
        "users",
    )
    .unwrap();

    assert_eq!(resource.get("id"), Some(&TypedValue::String("u-2".to_string())));
    assert_eq!(resource.get("name"), Some(&TypedValue::String("Bo".to_string())));
    assert_eq!(resource.get("age"), Some(&TypedValue::Int(51)));
    assert_eq!(resource.get("active"), Some(&TypedValue::Bool(false)));
}

#[test]
fn test_unknown_fields_are_dropped_silently() {
    let mut store = MemoryStore::new();
    store.insert_json("users", json!({"name": "Ann"})).unwrap();
    let snapshot = snapshot_of(&store);

    let resource = convert::to_resource(
        &snapshot,
        &doc(json!({"name": "Bo", "unsampled": 1})),
        "users",
    )
    .unwrap();

    assert_eq!(resource.get("unsampled"), None);
    assert_eq!(resource.get("name"), Some(&TypedValue::String("Bo".to_string())));
}

#[test]
fn test_null_and_absent_collections_become_empty() {
    let mut store = MemoryStore::new();
    store
        .insert_json("posts", json!({"title": "a", "tags": ["rust"]}))
        .unwrap();
    let snapshot = snapshot_of(&store);

    let with_null =
        convert::to_resource(&snapshot, &doc(json!({"title": "b", "tags": null})), "posts")
            .unwrap();
    assert_eq!(with_null.get("tags"), Some(&TypedValue::Array(Vec::new())));

    let with_absent =
        convert::to_resource(&snapshot, &doc(json!({"title": "c"})), "posts").unwrap();
    assert_eq!(with_absent.get("tags"), Some(&TypedValue::Array(Vec::new())));
}

#[test]
fn test_null_collection_elements_are_skipped() {
    let mut store = MemoryStore::new();
    store
        .insert_json("posts", json!({"tags": ["rust"]}))
        .unwrap();
    let snapshot = snapshot_of(&store);

    let resource = convert::to_resource(
        &snapshot,
        &doc(json!({"tags": ["a", null, "b"]})),
        "posts",
    )
    .unwrap();
    assert_eq!(
        resource.get("tags"),
        Some(&TypedValue::Array(vec![
            TypedValue::String("a".to_string()),
            TypedValue::String("b".to_string()),
        ]))
    );
}

#[test]
fn test_nested_complex_conversion() {
    let mut store = MemoryStore::new();
    store
        .insert_json("users", json!({"address": {"city": "Oslo", "zip": 1234}}))
        .unwrap();
    let snapshot = snapshot_of(&store);

    let resource = convert::to_resource(
        &snapshot,
        &doc(json!({"address": {"city": "Bergen", "zip": 5003}})),
        "users",
    )
    .unwrap();

    let Some(TypedValue::Resource(address)) = resource.get("address") else {
        panic!("expected nested resource");
    };
    assert_eq!(address.type_name(), "users__address");
    assert_eq!(address.get("city"), Some(&TypedValue::String("Bergen".to_string())));
    assert_eq!(address.get("zip"), Some(&TypedValue::Int(5003)));
}

#[test]
fn test_null_complex_value_stays_absent() {
    let mut store = MemoryStore::new();
    store
        .insert_json("users", json!({"address": {"city": "Oslo"}}))
        .unwrap();
    let snapshot = snapshot_of(&store);

    let resource =
        convert::to_resource(&snapshot, &doc(json!({"address": null})), "users").unwrap();
    assert_eq!(resource.get("address"), None);
}

#[test]
fn test_coercion_failure_is_fatal_for_the_call() {
    let mut store = MemoryStore::new();
    store.insert_json("users", json!({"age": 34})).unwrap();
    let snapshot = snapshot_of(&store);

    let err = convert::to_resource(&snapshot, &doc(json!({"age": "nine"})), "users").unwrap_err();
    assert!(matches!(err, ConvertError::Coercion { ref property, .. } if property == "age"));
}

#[test]
fn test_numeric_widening_coercions() {
    let mut store = MemoryStore::new();
    store
        .insert_json("metrics", json!({"count": 1, "ratio": 0.5}))
        .unwrap();
    let snapshot = snapshot_of(&store);

    // Integral float into an int64 property, int into a float64 property.
    let resource = convert::to_resource(
        &snapshot,
        &doc(json!({"count": 3.0, "ratio": 2})),
        "metrics",
    )
    .unwrap();
    assert_eq!(resource.get("count"), Some(&TypedValue::Int(3)));
    assert_eq!(resource.get("ratio"), Some(&TypedValue::Float(2.0)));

    let err =
        convert::to_resource(&snapshot, &doc(json!({"count": 3.5})), "metrics").unwrap_err();
    assert!(matches!(err, ConvertError::Coercion { .. }));
}

#[test]
fn test_unknown_resource_name_is_schema_error() {
    let snapshot = snapshot_of(&MemoryStore::new());
    let err = convert::to_resource(&snapshot, &doc(json!({})), "ghost").unwrap_err();
    assert!(matches!(err, ConvertError::Schema(_)));
}

#[test]
fn test_to_document_is_sparse() {
    let mut store = MemoryStore::new();
    store
        .insert_json("users", json!({"id": "u-1", "name": "Ann", "age": 34}))
        .unwrap();
    let snapshot = snapshot_of(&store);

    let resource = convert::to_resource(&snapshot, &doc(json!({"name": "Bo"})), "users")
        .unwrap();

    let document = convert::to_document(&snapshot, &resource, "users").unwrap();
    assert_eq!(document.to_json(), json!({"name": "Bo"}));
}

#[test]
fn test_any_scalar_coerces_into_string_property() {
    let mut cache = MetadataCache::new();
    cache.add_entity_type("blobs");
    cache.add_resource_set("blobs", "blobs");
    cache.add_primitive_property("blobs", "payload", PropertyType::String);
    let snapshot = cache.clone_snapshot();

    let mut document = Document::new();
    document.set("payload", DocumentValue::Bytes(vec![1, 2, 3]));
    let resource = convert::to_resource(&snapshot, &document, "blobs").unwrap();
    assert_eq!(
        resource.get("payload"),
        Some(&TypedValue::String("AQID".to_string()))
    );

    let mut document = Document::new();
    document.set("payload", DocumentValue::TimeSpan(Duration::milliseconds(1500)));
    let resource = convert::to_resource(&snapshot, &document, "blobs").unwrap();
    assert_eq!(
        resource.get("payload"),
        Some(&TypedValue::String("1.5".to_string()))
    );
}

#[test]
fn test_fractional_timestamps_survive_write_back() {
    let mut store = MemoryStore::new();
    let original = json!({"at": "2024-01-01T00:00:00.500Z"});
    store.insert_json("events", original.clone()).unwrap();
    let snapshot = snapshot_of(&store);

    let resource = convert::to_resource(&snapshot, &doc(original.clone()), "events").unwrap();
    let document = convert::to_document(&snapshot, &resource, "events").unwrap();
    assert_eq!(document.to_json(), original);
}

#[test]
fn test_round_trip_preserves_values() {
    let mut store = MemoryStore::new();
    let original = json!({
        "id": "u-1",
        "name": "Ann",
        "age": 34,
        "address": {"city": "Oslo"},
        "tags": ["rust", "docs"]
    });
    store.insert_json("users", original.clone()).unwrap();
    let snapshot = snapshot_of(&store);

    let resource = convert::to_resource(&snapshot, &doc(original.clone()), "users").unwrap();
    let document = convert::to_document(&snapshot, &resource, "users").unwrap();
    assert_eq!(document.to_json(), original);
}
