pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core entities and value objects
pub use domain::{
    // Models
    Category,
    Document,
    // Value objects
    DocumentId,
    PictureName,
    PriceInput,
    Product,
    ProductChanges,
    ProductDraft,
    // Errors
    StorageError,
    StorageResult,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{
    ByteStream,
    // Service ports
    CatalogService,
    CategoryRepository,
    // Repository ports
    DocumentRepository,
    // Storage ports
    PictureStore,
    ProductRepository,
};

// Service implementations - business logic
pub use services::{CatalogServiceBuilder, CatalogServiceImpl};

// Application factory and configuration
pub use app::{
    create_in_memory_app, create_mongodb_app, seed_sample_data, AppBuilder, AppConfig,
    AppDependencies, AppError, AppServices, DocumentBackend, PictureBackend, UpdateStatus,
};

// Adapter types - infrastructure implementations
pub use adapters::inbound::http::{create_router, AppState};
pub use adapters::outbound::{
    persistence::{InMemoryDocumentRepository, MongoConfig, MongoDocumentRepository},
    storage::ObjectStorePictureStore,
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, create_mongodb_app, create_router, AppBuilder, AppServices,
        AppState, CatalogService, CatalogServiceImpl, Category, DocumentId, DocumentRepository,
        InMemoryDocumentRepository, MongoDocumentRepository, ObjectStorePictureStore,
        PictureStore, Product,
    };
}
