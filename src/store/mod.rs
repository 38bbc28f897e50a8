//! Document store collaborator interface.
//!
//! The schema engine never talks to a concrete database. It consumes this
//! trait: by-name collection lookup plus synchronous, lazily-produced
//! document enumeration. The sampler bounds how much of the sequence it
//! pulls; implementations must not assume the iterator is drained.

mod memory;

pub use memory::MemoryStore;

use crate::document::Document;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a document store implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("document root must be a JSON object")]
    NotAnObject,
}

/// Direction in which a collection's natural order is enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    Ascending,
    Descending,
}

/// Sequential access to the raw documents of a named collection.
pub trait DocumentStore {
    /// Names of all collections in the store.
    fn list_collection_names(&self) -> StoreResult<Vec<String>>;

    /// Lazily enumerate the documents of a collection in natural order.
    fn enumerate_documents<'a>(
        &'a self,
        collection: &str,
        order: ScanOrder,
    ) -> StoreResult<Box<dyn Iterator<Item = Document> + 'a>>;
}
