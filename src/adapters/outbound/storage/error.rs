use crate::domain::errors::StorageError;
use mongodb::bson;

/// Convert object_store errors to domain storage errors
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::PictureNotFound {
                filename: path.to_string(),
            },
            object_store::Error::PermissionDenied { path, .. }
            | object_store::Error::Unauthenticated { path, .. } => StorageError::AccessDenied {
                operation: format!("picture store access to {}", path),
            },
            _ => StorageError::InfrastructureError {
                message: format!("Picture store operation failed: {}", err),
                source: Some(err.to_string()),
            },
        }
    }
}

/// Convert standard io::Error to domain errors
impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => StorageError::AccessDenied {
                operation: "io_operation".to_string(),
            },
            _ => StorageError::InfrastructureError {
                message: format!("IO error: {}", err),
                source: Some(err.to_string()),
            },
        }
    }
}

/// Convert MongoDB driver errors to domain errors
impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        StorageError::InfrastructureError {
            message: format!("Document store operation failed: {}", err),
            source: Some(err.to_string()),
        }
    }
}

impl From<bson::ser::Error> for StorageError {
    fn from(err: bson::ser::Error) -> Self {
        StorageError::SerializationError {
            message: format!("Failed to encode document: {}", err),
        }
    }
}

impl From<bson::de::Error> for StorageError {
    fn from(err: bson::de::Error) -> Self {
        StorageError::SerializationError {
            message: format!("Failed to decode document: {}", err),
        }
    }
}

/// Convert domain StorageError to HTTP status codes for API responses
impl From<&StorageError> for http::StatusCode {
    fn from(err: &StorageError) -> Self {
        match err {
            StorageError::DocumentNotFound { .. } | StorageError::PictureNotFound { .. } => {
                http::StatusCode::NOT_FOUND
            }
            StorageError::AccessDenied { .. } => http::StatusCode::FORBIDDEN,
            StorageError::SerializationError { .. }
            | StorageError::PictureWriteFailed { .. }
            | StorageError::InfrastructureError { .. }
            | StorageError::InternalError { .. } => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
