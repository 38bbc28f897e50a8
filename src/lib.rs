//! # docmodel
//!
//! A statically-typed resource model over schema-less document collections.
//!
//! Documents whose shape varies record-to-record are sampled (a bounded
//! prefix or suffix of each collection) to incrementally infer a consistent
//! typed schema — entities, complex sub-objects, collections, keys — and raw
//! documents are converted to and from typed resource instances under that
//! inferred, evolving schema. Inference never rejects a document: the schema
//! always widens to accommodate what it sees.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              DocumentStore (external)                    │
//! │     (collection names, lazy document enumeration)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sampler: bounded sampling pass]
//! ┌─────────────────────────────────────────────────────────┐
//! │       Type Resolver (classification + naming rules)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [widening registration]
//! ┌─────────────────────────────────────────────────────────┐
//! │   MetadataCache (types, sets, provider/generated types)  │
//! │        per connection, inside a MetadataRegistry         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [clone_snapshot]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Converter (document ↔ TypedResource)                   │
//! │   Materializer (TypeShape for the typed query path)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`metadata::SchemaProvider`] facade composes the pieces for one
//! connection; the [`store::MemoryStore`] serves as the reference
//! [`store::DocumentStore`] implementation.

pub mod config;
pub mod convert;
pub mod document;
pub mod materializer;
pub mod metadata;
pub mod sampler;
pub mod schema;
pub mod store;

pub use config::{FetchPosition, MetadataConfig, Settings};
pub use convert::{ConvertError, TypedResource, TypedValue};
pub use document::{Document, DocumentValue};
pub use metadata::{MetadataError, MetadataRegistry, MetadataSnapshot, SchemaProvider};
pub use store::{DocumentStore, MemoryStore, ScanOrder, StoreError};
