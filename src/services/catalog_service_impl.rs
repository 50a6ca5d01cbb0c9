use async_trait::async_trait;
use chrono::Utc;
use futures::{
    stream::{self, BoxStream},
    StreamExt, TryStreamExt,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    domain::{
        errors::StorageResult,
        models::{Category, Product, ProductChanges},
        value_objects::{DocumentId, PictureName},
    },
    ports::{
        repositories::{CategoryRepository, ProductRepository},
        services::CatalogService,
        storage::{ByteStream, PictureStore},
    },
};

/// Implementation of CatalogService on top of the document and picture stores
#[derive(Clone)]
pub struct CatalogServiceImpl {
    products: Arc<ProductRepository>,
    categories: Arc<CategoryRepository>,
    pictures: Arc<dyn PictureStore>,
}

impl CatalogServiceImpl {
    /// Create a new CatalogServiceImpl instance
    pub fn new(
        products: Arc<ProductRepository>,
        categories: Arc<CategoryRepository>,
        pictures: Arc<dyn PictureStore>,
    ) -> Self {
        Self {
            products,
            categories,
            pictures,
        }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    fn list_all(&self) -> BoxStream<'static, StorageResult<Product>> {
        self.products.find_all()
    }

    fn list_all_name_uppercased(&self) -> BoxStream<'static, StorageResult<Product>> {
        self.products
            .find_all()
            .map_ok(Product::with_uppercased_name)
            .boxed()
    }

    fn list_all_name_uppercased_repeated(
        &self,
        times: usize,
    ) -> BoxStream<'static, StorageResult<Product>> {
        let products = self.products.clone();

        // Every repetition reads the collection again
        stream::iter(0..times)
            .flat_map(move |_| {
                products
                    .find_all()
                    .map_ok(Product::with_uppercased_name)
            })
            .boxed()
    }

    async fn get_by_id(&self, id: &DocumentId) -> StorageResult<Option<Product>> {
        self.products.find_by_id(id).await
    }

    async fn create(&self, mut product: Product) -> StorageResult<Product> {
        if product.created_at.is_none() {
            product.created_at = Some(Utc::now());
        }

        let saved = self.products.save(product).await?;
        info!(
            product_id = ?saved.id.as_ref().map(DocumentId::as_str),
            name = %saved.name,
            "Product created"
        );
        Ok(saved)
    }

    async fn update(
        &self,
        id: &DocumentId,
        changes: ProductChanges,
    ) -> StorageResult<Option<Product>> {
        let Some(mut existing) = self.products.find_by_id(id).await? else {
            return Ok(None);
        };

        existing.apply_changes(changes);
        let saved = self.products.save(existing).await?;
        info!(product_id = %id, "Product updated");
        Ok(Some(saved))
    }

    async fn save(&self, product: Product) -> StorageResult<Product> {
        self.products.save(product).await
    }

    async fn delete(&self, id: &DocumentId) -> StorageResult<Option<()>> {
        let Some(existing) = self.products.find_by_id(id).await? else {
            return Ok(None);
        };

        self.products.delete(&existing).await?;
        info!(product_id = %id, "Product deleted");
        Ok(Some(()))
    }

    async fn store_picture(
        &self,
        original_filename: &str,
        data: ByteStream<'_>,
    ) -> StorageResult<PictureName> {
        self.pictures.store(original_filename, data).await
    }

    async fn discard_picture(&self, name: &PictureName) -> StorageResult<()> {
        self.pictures.discard(name).await
    }

    async fn upload_picture(
        &self,
        id: &DocumentId,
        original_filename: &str,
        data: ByteStream<'_>,
    ) -> StorageResult<Option<Product>> {
        let Some(mut product) = self.products.find_by_id(id).await? else {
            return Ok(None);
        };

        // The product is only persisted once the file is completely written
        let picture = self.pictures.store(original_filename, data).await?;
        product.picture = Some(picture.as_str().to_string());

        match self.products.save(product).await {
            Ok(saved) => {
                info!(product_id = %id, picture = %picture, "Product picture uploaded");
                Ok(Some(saved))
            }
            Err(e) => {
                if let Err(discard_err) = self.pictures.discard(&picture).await {
                    warn!(picture = %picture, error = %discard_err, "Failed to discard orphaned picture");
                }
                Err(e)
            }
        }
    }

    fn list_categories(&self) -> BoxStream<'static, StorageResult<Category>> {
        self.categories.find_all()
    }

    async fn get_category(&self, id: &DocumentId) -> StorageResult<Option<Category>> {
        self.categories.find_by_id(id).await
    }

    async fn save_category(&self, category: Category) -> StorageResult<Category> {
        let saved = self.categories.save(category).await?;
        info!(
            category_id = ?saved.id.as_ref().map(DocumentId::as_str),
            name = %saved.name,
            "Category saved"
        );
        Ok(saved)
    }

    async fn delete_category(&self, id: &DocumentId) -> StorageResult<Option<()>> {
        let Some(existing) = self.categories.find_by_id(id).await? else {
            return Ok(None);
        };

        // Products keep their embedded copy of the category
        self.categories.delete(&existing).await?;
        info!(category_id = %id, "Category deleted");
        Ok(Some(()))
    }
}

/// Builder for CatalogServiceImpl
pub struct CatalogServiceBuilder {
    products: Option<Arc<ProductRepository>>,
    categories: Option<Arc<CategoryRepository>>,
    pictures: Option<Arc<dyn PictureStore>>,
}

impl CatalogServiceBuilder {
    pub fn new() -> Self {
        Self {
            products: None,
            categories: None,
            pictures: None,
        }
    }

    pub fn products(mut self, products: Arc<ProductRepository>) -> Self {
        self.products = Some(products);
        self
    }

    pub fn categories(mut self, categories: Arc<CategoryRepository>) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn pictures(mut self, pictures: Arc<dyn PictureStore>) -> Self {
        self.pictures = Some(pictures);
        self
    }

    pub fn build(self) -> Result<CatalogServiceImpl, &'static str> {
        let products = self.products.ok_or("Product repository is required")?;
        let categories = self.categories.ok_or("Category repository is required")?;
        let pictures = self.pictures.ok_or("Picture store is required")?;

        Ok(CatalogServiceImpl::new(products, categories, pictures))
    }
}

impl Default for CatalogServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
