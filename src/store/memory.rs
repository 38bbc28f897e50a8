use std::collections::BTreeMap;

use crate::document::Document;

use super::{DocumentStore, ScanOrder, StoreError, StoreResult};

/// In-memory document store.
///
/// Reference implementation of [`DocumentStore`], used by the test suite and
/// for serving fixed document sets without a backing database. Insertion
/// order is each collection's natural order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Append a document to a collection, creating the collection on first use.
    pub fn insert(&mut self, collection: &str, document: Document) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Append a JSON object to a collection.
    pub fn insert_json(&mut self, collection: &str, value: serde_json::Value) -> StoreResult<()> {
        let document = Document::from_json(value).ok_or(StoreError::NotAnObject)?;
        self.insert(collection, document);
        Ok(())
    }

    /// Create an empty collection if it does not exist.
    pub fn create_collection(&mut self, collection: &str) {
        self.collections.entry(collection.to_string()).or_default();
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, Vec::len)
    }
}

impl DocumentStore for MemoryStore {
    fn list_collection_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.collections.keys().cloned().collect())
    }

    fn enumerate_documents<'a>(
        &'a self,
        collection: &str,
        order: ScanOrder,
    ) -> StoreResult<Box<dyn Iterator<Item = Document> + 'a>> {
        let documents = self
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        match order {
            ScanOrder::Ascending => Ok(Box::new(documents.iter().cloned())),
            ScanOrder::Descending => Ok(Box::new(documents.iter().rev().cloned())),
        }
    }
}
