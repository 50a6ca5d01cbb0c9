use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::{
    domain::{
        errors::StorageResult,
        models::{Category, Product, ProductChanges},
        value_objects::{DocumentId, PictureName},
    },
    ports::storage::ByteStream,
};

/// Port for the product and category operations exposed over HTTP.
///
/// Lookups that miss return `Ok(None)`; only store failures are errors.
#[async_trait]
pub trait CatalogService: Send + Sync + 'static {
    /// Stream all products
    fn list_all(&self) -> BoxStream<'static, StorageResult<Product>>;

    /// Stream all products with their names upper-cased (nothing is persisted)
    fn list_all_name_uppercased(&self) -> BoxStream<'static, StorageResult<Product>>;

    /// The upper-cased listing concatenated `times` times
    fn list_all_name_uppercased_repeated(
        &self,
        times: usize,
    ) -> BoxStream<'static, StorageResult<Product>>;

    /// Get a product by id
    async fn get_by_id(&self, id: &DocumentId) -> StorageResult<Option<Product>>;

    /// Persist a new product, stamping `created_at` when it is absent
    async fn create(&self, product: Product) -> StorageResult<Product>;

    /// Overwrite name, price and category of an existing product
    async fn update(
        &self,
        id: &DocumentId,
        changes: ProductChanges,
    ) -> StorageResult<Option<Product>>;

    /// Insert or replace a product as-is
    async fn save(&self, product: Product) -> StorageResult<Product>;

    /// Delete a product; `None` when no product has this id
    async fn delete(&self, id: &DocumentId) -> StorageResult<Option<()>>;

    /// Write an uploaded picture and return its stored name
    async fn store_picture(
        &self,
        original_filename: &str,
        data: ByteStream<'_>,
    ) -> StorageResult<PictureName>;

    /// Remove a picture that ended up unreferenced
    async fn discard_picture(&self, name: &PictureName) -> StorageResult<()>;

    /// Write a picture for an existing product and persist the new reference
    async fn upload_picture(
        &self,
        id: &DocumentId,
        original_filename: &str,
        data: ByteStream<'_>,
    ) -> StorageResult<Option<Product>>;

    /// Stream all categories
    fn list_categories(&self) -> BoxStream<'static, StorageResult<Category>>;

    /// Get a category by id
    async fn get_category(&self, id: &DocumentId) -> StorageResult<Option<Category>>;

    /// Insert or replace a category
    async fn save_category(&self, category: Category) -> StorageResult<Category>;

    /// Delete a category; products embedding it are left untouched
    async fn delete_category(&self, id: &DocumentId) -> StorageResult<Option<()>>;
}
