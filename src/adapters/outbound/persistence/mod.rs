pub mod in_memory_document_repository;
pub mod mongo_document_repository;

pub use in_memory_document_repository::InMemoryDocumentRepository;
pub use mongo_document_repository::{connect, MongoConfig, MongoDocumentRepository};
