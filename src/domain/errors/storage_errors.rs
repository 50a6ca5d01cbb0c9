use crate::domain::value_objects::DocumentId;

/// Errors that can occur while talking to the document store or the picture store
#[derive(Debug, Clone)]
pub enum StorageError {
    /// No document with this id exists in the collection
    DocumentNotFound {
        collection: &'static str,
        id: DocumentId,
    },

    /// Entity could not be mapped to or from its stored representation
    SerializationError { message: String },

    /// No stored picture with this name
    PictureNotFound { filename: String },

    /// Picture file could not be written or removed
    PictureWriteFailed { filename: String, message: String },

    /// Access denied by the underlying store or filesystem
    AccessDenied { operation: String },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },

    /// Generic storage error
    InternalError { message: String },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::DocumentNotFound { collection, id } => {
                write!(f, "Document '{}' not found in collection '{}'", id, collection)
            }
            StorageError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
            StorageError::PictureNotFound { filename } => {
                write!(f, "Picture not found: {}", filename)
            }
            StorageError::PictureWriteFailed { filename, message } => {
                write!(f, "Failed to write picture '{}': {}", filename, message)
            }
            StorageError::AccessDenied { operation } => {
                write!(f, "Access denied for operation '{}'", operation)
            }
            StorageError::InfrastructureError { message, .. } => {
                write!(f, "Infrastructure error: {}", message)
            }
            StorageError::InternalError { message } => {
                write!(f, "Internal storage error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
