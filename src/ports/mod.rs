pub mod repositories;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use repositories::{CategoryRepository, DocumentRepository, ProductRepository};
pub use services::CatalogService;
pub use storage::{ByteStream, PictureStore};
