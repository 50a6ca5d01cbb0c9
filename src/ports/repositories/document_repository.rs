use crate::domain::{
    errors::StorageResult,
    models::{Category, Document, Product},
    value_objects::DocumentId,
};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Repository for one collection of documents in the document store
#[async_trait]
pub trait DocumentRepository<T: Document>: Send + Sync + 'static {
    /// Stream every document of the collection.
    ///
    /// The stream is lazy: nothing is read until it is polled, and each call
    /// starts a fresh read of the collection.
    fn find_all(&self) -> BoxStream<'static, StorageResult<T>>;

    /// Look up a document by id
    async fn find_by_id(&self, id: &DocumentId) -> StorageResult<Option<T>>;

    /// Insert the entity when it has no id yet, replace the stored document otherwise.
    /// Returns the persisted entity with its id populated.
    async fn save(&self, entity: T) -> StorageResult<T>;

    /// Delete the stored document with the entity's id
    async fn delete(&self, entity: &T) -> StorageResult<()>;

    /// Number of documents in the collection
    async fn count(&self) -> StorageResult<u64>;

    /// Remove every document of the collection
    async fn delete_all(&self) -> StorageResult<()>;
}

/// Repository port for products
pub type ProductRepository = dyn DocumentRepository<Product>;

/// Repository port for categories
pub type CategoryRepository = dyn DocumentRepository<Category>;
