use axum::{http::StatusCode, Router};
use object_store::memory::InMemory;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

use crate::{
    adapters::{
        inbound::http::{create_router, AppState},
        outbound::{
            persistence::{connect, InMemoryDocumentRepository, MongoConfig, MongoDocumentRepository},
            storage::ObjectStorePictureStore,
        },
    },
    domain::{
        errors::StorageResult,
        models::{Category, Product},
    },
    ports::{
        repositories::{CategoryRepository, ProductRepository},
        storage::PictureStore,
    },
    services::CatalogServiceImpl,
};

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub document_backend: DocumentBackend,
    pub picture_backend: PictureBackend,
    pub update_status: UpdateStatus,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            document_backend: DocumentBackend::InMemory,
            picture_backend: PictureBackend::InMemory,
            update_status: UpdateStatus::Created,
        }
    }
}

/// Document store backend configuration
#[derive(Debug, Clone)]
pub enum DocumentBackend {
    InMemory,
    MongoDb(MongoConfig),
}

/// Picture store backend configuration
#[derive(Debug, Clone)]
pub enum PictureBackend {
    InMemory,
    LocalDirectory { path: PathBuf },
}

/// Status answered by a successful product update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateStatus {
    #[default]
    Created,
    Ok,
}

impl From<UpdateStatus> for StatusCode {
    fn from(status: UpdateStatus) -> Self {
        match status {
            UpdateStatus::Created => StatusCode::CREATED,
            UpdateStatus::Ok => StatusCode::OK,
        }
    }
}

/// Application dependencies container
pub struct AppDependencies {
    pub product_repository: Arc<ProductRepository>,
    pub category_repository: Arc<CategoryRepository>,
    pub picture_store: Arc<dyn PictureStore>,
}

/// Application services container
pub struct AppServices {
    pub catalog_service: Arc<CatalogServiceImpl>,
    pub update_status: UpdateStatus,
}

impl AppServices {
    /// Handler state for these services
    pub fn app_state(&self) -> AppState {
        AppState::new(self.catalog_service.clone())
            .with_update_status(self.update_status.into())
    }

    /// The full HTTP router over these services
    pub fn router(&self) -> Router {
        create_router(self.app_state())
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure document store backend
    pub fn with_document_backend(mut self, backend: DocumentBackend) -> Self {
        self.config.document_backend = backend;
        self
    }

    /// Configure picture store backend
    pub fn with_picture_backend(mut self, backend: PictureBackend) -> Self {
        self.config.picture_backend = backend;
        self
    }

    /// Configure the status answered by product updates
    pub fn with_update_status(mut self, status: UpdateStatus) -> Self {
        self.config.update_status = status;
        self
    }

    /// Build the application dependencies
    pub async fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        let (product_repository, category_repository) = self.create_repositories().await?;
        let picture_store = self.create_picture_store().await?;

        Ok(AppDependencies {
            product_repository,
            category_repository,
            picture_store,
        })
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let deps = self.build_dependencies().await?;
        Ok(self.build_with(deps))
    }

    /// Build services over already created dependencies
    pub fn build_with(&self, deps: AppDependencies) -> AppServices {
        let catalog_service = CatalogServiceImpl::new(
            deps.product_repository,
            deps.category_repository,
            deps.picture_store,
        );

        AppServices {
            catalog_service: Arc::new(catalog_service),
            update_status: self.config.update_status,
        }
    }

    /// Create repositories based on configuration
    async fn create_repositories(
        &self,
    ) -> Result<(Arc<ProductRepository>, Arc<CategoryRepository>), AppError> {
        match &self.config.document_backend {
            DocumentBackend::InMemory => {
                info!("Using in-memory document store");
                let products: Arc<ProductRepository> =
                    Arc::new(InMemoryDocumentRepository::<Product>::new());
                let categories: Arc<CategoryRepository> =
                    Arc::new(InMemoryDocumentRepository::<Category>::new());
                Ok((products, categories))
            }
            DocumentBackend::MongoDb(config) => {
                let db = connect(config)
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: e.to_string(),
                    })?;
                let products: Arc<ProductRepository> =
                    Arc::new(MongoDocumentRepository::<Product>::new(&db));
                let categories: Arc<CategoryRepository> =
                    Arc::new(MongoDocumentRepository::<Category>::new(&db));
                Ok((products, categories))
            }
        }
    }

    /// Create the picture store based on configuration
    async fn create_picture_store(&self) -> Result<Arc<dyn PictureStore>, AppError> {
        match &self.config.picture_backend {
            PictureBackend::InMemory => {
                Ok(Arc::new(ObjectStorePictureStore::new(Arc::new(InMemory::new()))))
            }
            PictureBackend::LocalDirectory { path } => {
                let store = ObjectStorePictureStore::local(path).await.map_err(|e| {
                    AppError::StorageInit {
                        message: format!("{}: {}", path.display(), e),
                    }
                })?;
                Ok(Arc::new(store))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Picture store initialization error: {message}")]
    StorageInit { message: String },

    #[error("Document store initialization error: {message}")]
    RepositoryInit { message: String },

    #[error("Sample data error: {message}")]
    Seed { message: String },
}

/// Sample categories written by `seed_sample_data`
pub const SAMPLE_CATEGORIES: [&str; 4] = ["electronics", "sport", "computation", "furniture"];

/// Sample products written by `seed_sample_data`: name, price, category
pub const SAMPLE_PRODUCTS: [(&str, f64, &str); 9] = [
    ("TV Panasonic Pantalla LCD", 456.89, "electronics"),
    ("Sony Camara HD Digital", 177.89, "electronics"),
    ("Apple iPod", 46.89, "electronics"),
    ("Sony Notebook", 846.89, "computation"),
    ("Hewlett Packard Multifuncional", 200.89, "computation"),
    ("Bianchi Bicicleta", 70.89, "sport"),
    ("HP Notebook Omen 17", 2500.89, "computation"),
    ("Mica Cómoda 5 Cajones", 150.89, "furniture"),
    ("TV Sony Bravia OLED 4K Ultra HD", 2255.89, "electronics"),
];

/// Replace the contents of both collections with the sample catalog
pub async fn seed_sample_data(deps: &AppDependencies) -> Result<(), AppError> {
    seed(deps).await.map_err(|e| AppError::Seed {
        message: e.to_string(),
    })
}

async fn seed(deps: &AppDependencies) -> StorageResult<()> {
    deps.product_repository.delete_all().await?;
    deps.category_repository.delete_all().await?;

    let mut categories = Vec::with_capacity(SAMPLE_CATEGORIES.len());
    for name in SAMPLE_CATEGORIES {
        let category = deps.category_repository.save(Category::new(name)).await?;
        info!(
            category_id = ?category.id.as_ref().map(|id| id.as_str()),
            name = %category.name,
            "Category created"
        );
        categories.push(category);
    }

    for (name, price, category_name) in SAMPLE_PRODUCTS {
        let category = categories
            .iter()
            .find(|c| c.name == category_name)
            .cloned()
            .unwrap_or_else(|| Category::new(category_name));

        let mut product = Product::new(name, price, category);
        product.created_at = Some(chrono::Utc::now());

        let product = deps.product_repository.save(product).await?;
        info!(
            product_id = ?product.id.as_ref().map(|id| id.as_str()),
            name = %product.name,
            "Product inserted"
        );
    }

    Ok(())
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_document_backend(DocumentBackend::InMemory)
        .with_picture_backend(PictureBackend::InMemory)
        .build()
        .await
}

/// Create a MongoDB-backed application storing pictures under `uploads_path`
pub async fn create_mongodb_app(
    config: MongoConfig,
    uploads_path: impl Into<PathBuf>,
) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_document_backend(DocumentBackend::MongoDb(config))
        .with_picture_backend(PictureBackend::LocalDirectory {
            path: uploads_path.into(),
        })
        .build()
        .await
}
