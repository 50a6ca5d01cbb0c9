use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::Document,
        value_objects::DocumentId,
    },
    ports::repositories::DocumentRepository,
};

/// Documents of one collection, kept in insertion order
struct Collection<T> {
    next_sequence: u64,
    sequence_by_id: BTreeMap<DocumentId, u64>,
    documents: BTreeMap<u64, T>,
}

impl<T> Collection<T> {
    fn new() -> Self {
        Self {
            next_sequence: 0,
            sequence_by_id: BTreeMap::new(),
            documents: BTreeMap::new(),
        }
    }

    fn get(&self, id: &DocumentId) -> Option<&T> {
        self.sequence_by_id
            .get(id)
            .and_then(|sequence| self.documents.get(sequence))
    }

    /// Replacing a document keeps its original position
    fn upsert(&mut self, id: DocumentId, document: T) {
        let sequence = match self.sequence_by_id.get(&id) {
            Some(sequence) => *sequence,
            None => {
                let sequence = self.next_sequence;
                self.next_sequence += 1;
                self.sequence_by_id.insert(id, sequence);
                sequence
            }
        };
        self.documents.insert(sequence, document);
    }

    fn remove(&mut self, id: &DocumentId) -> Option<T> {
        let sequence = self.sequence_by_id.remove(id)?;
        self.documents.remove(&sequence)
    }

    fn clear(&mut self) {
        self.sequence_by_id.clear();
        self.documents.clear();
    }
}

/// In-memory implementation of DocumentRepository for testing and development
#[derive(Clone)]
pub struct InMemoryDocumentRepository<T: Document> {
    collection: Arc<RwLock<Collection<T>>>,
}

impl<T: Document> InMemoryDocumentRepository<T> {
    pub fn new() -> Self {
        Self {
            collection: Arc::new(RwLock::new(Collection::new())),
        }
    }
}

impl<T: Document> Default for InMemoryDocumentRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> DocumentRepository<T> for InMemoryDocumentRepository<T> {
    fn find_all(&self) -> BoxStream<'static, StorageResult<T>> {
        let collection = self.collection.clone();

        // Snapshot on first poll, not on call
        stream::once(async move {
            let data = collection.read().await;
            data.documents.values().cloned().map(Ok).collect::<Vec<_>>()
        })
        .flat_map(stream::iter)
        .boxed()
    }

    async fn find_by_id(&self, id: &DocumentId) -> StorageResult<Option<T>> {
        let data = self.collection.read().await;
        Ok(data.get(id).cloned())
    }

    async fn save(&self, mut entity: T) -> StorageResult<T> {
        let id = match entity.id() {
            Some(id) => id.clone(),
            None => {
                let id = DocumentId::generate();
                entity.set_id(id.clone());
                id
            }
        };

        let mut data = self.collection.write().await;
        data.upsert(id, entity.clone());

        Ok(entity)
    }

    async fn delete(&self, entity: &T) -> StorageResult<()> {
        let id = entity.id().ok_or_else(|| StorageError::InternalError {
            message: format!("Cannot delete an unsaved {} document", T::COLLECTION),
        })?;

        let mut data = self.collection.write().await;
        match data.remove(id) {
            Some(_) => Ok(()),
            None => Err(StorageError::DocumentNotFound {
                collection: T::COLLECTION,
                id: id.clone(),
            }),
        }
    }

    async fn count(&self) -> StorageResult<u64> {
        let data = self.collection.read().await;
        Ok(data.documents.len() as u64)
    }

    async fn delete_all(&self) -> StorageResult<()> {
        let mut data = self.collection.write().await;
        data.clear();
        Ok(())
    }
}
