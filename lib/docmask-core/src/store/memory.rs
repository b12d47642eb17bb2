use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::CollectionRef;
use crate::error::StoreError;
use crate::node::Document;
use crate::pipeline::{DocumentSink, DocumentSource};

/// Collections kept in memory.
///
/// Clones share the same collections, so a sink and a source opened on two
/// clones see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<CollectionRef, Vec<Document>>>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content of `collection`.
    pub async fn insert(
        &self,
        collection: CollectionRef,
        documents: impl IntoIterator<Item = Document>,
    ) {
        let mut collections = self.collections.lock().await;
        collections.insert(collection, documents.into_iter().collect());
    }

    /// A copy of the content of `collection` (empty if unknown).
    pub async fn documents(&self, collection: &CollectionRef) -> Vec<Document> {
        let collections = self.collections.lock().await;
        collections.get(collection).cloned().unwrap_or_default()
    }

    /// Read a snapshot of `collection` (empty if unknown).
    pub async fn source(&self, collection: &CollectionRef) -> MemorySource {
        MemorySource {
            documents: self.documents(collection).await.into(),
        }
    }

    /// Append to `collection`.
    #[must_use]
    pub fn sink(&self, collection: CollectionRef) -> MemorySink {
        MemorySink {
            store: self.clone(),
            collection,
            remaining_writes: None,
            writes: 0,
        }
    }
}

/// A snapshot of an in-memory collection.
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: VecDeque<Document>,
}

impl DocumentSource for MemorySource {
    async fn count(&mut self) -> Result<u64, StoreError> {
        Ok(self.documents.len() as u64)
    }

    async fn next_document(&mut self) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.pop_front())
    }
}

/// Appends to an in-memory collection.
#[derive(Debug)]
pub struct MemorySink {
    store: MemoryStore,
    collection: CollectionRef,
    remaining_writes: Option<usize>,
    writes: usize,
}

impl MemorySink {
    /// Reject every bulk insert after the first `writes` ones.
    #[must_use]
    pub fn failing_after(mut self, writes: usize) -> Self {
        self.remaining_writes = Some(writes);
        self
    }

    /// Number of successful bulk inserts.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DocumentSink for MemorySink {
    async fn insert_many(&mut self, documents: Vec<Document>) -> Result<(), StoreError> {
        if let Some(remaining) = self.remaining_writes.as_mut() {
            if *remaining == 0 {
                return Err(StoreError::Io(io::Error::other(format!(
                    "write to {} rejected",
                    self.collection
                ))));
            }
            *remaining -= 1;
        }

        let mut collections = self.store.collections.lock().await;
        collections
            .entry(self.collection.clone())
            .or_default()
            .extend(documents);
        self.writes += 1;
        Ok(())
    }
}
