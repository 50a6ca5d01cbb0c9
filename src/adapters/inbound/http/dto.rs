use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::{StorageError, ValidationError},
    models::{Category, Product},
};

/// Message carried by every product creation envelope
pub const PRODUCT_CREATED_MESSAGE: &str = "Product created successfully.";

/// Default number of repetitions for the repeated upper-cased listing
pub const DEFAULT_REPEAT_TIMES: usize = 5000;

/// Upper bound on repetitions a client may request
pub const MAX_REPEAT_TIMES: usize = 10_000;

/// Query parameters for product listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProductsDto {
    #[serde(default)]
    pub uppercase: bool,
}

/// Query parameters for the repeated listing
#[derive(Debug, Clone, Deserialize)]
pub struct RepeatProductsDto {
    #[serde(default = "default_repeat_times")]
    pub times: usize,
}

fn default_repeat_times() -> usize {
    DEFAULT_REPEAT_TIMES
}

impl RepeatProductsDto {
    /// Requested repetitions, capped at `MAX_REPEAT_TIMES`
    pub fn times(&self) -> usize {
        self.times.min(MAX_REPEAT_TIMES)
    }
}

/// DTO for creating a category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryDto {
    #[serde(default)]
    pub name: Option<String>,
}

impl CreateCategoryDto {
    pub fn into_category(self) -> Result<Category, Vec<ValidationError>> {
        let category = match self.name {
            Some(name) => Category::new(name),
            None => {
                return Err(vec![ValidationError::MissingField { field: "name" }]);
            }
        };
        category.validate()?;
        Ok(category)
    }
}

/// Envelope returned when a product is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreatedDto {
    pub product: Product,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub status: u16,
}

impl ProductCreatedDto {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            message: PRODUCT_CREATED_MESSAGE.to_string(),
            timestamp: Utc::now(),
            status: 201,
        }
    }
}

/// Envelope returned when a payload fails validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorResponseDto {
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub status: u16,
}

impl ValidationErrorResponseDto {
    pub fn from_validation_errors(errors: &[ValidationError]) -> Self {
        Self {
            errors: errors.iter().map(ToString::to_string).collect(),
            timestamp: Utc::now(),
            status: 400,
        }
    }
}

/// DTO for error responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponseDto {
    pub fn from_storage_error(error: &StorageError) -> Self {
        let kind = match error {
            StorageError::DocumentNotFound { .. } => "DocumentNotFound",
            StorageError::SerializationError { .. } => "SerializationError",
            StorageError::PictureNotFound { .. } => "PictureNotFound",
            StorageError::PictureWriteFailed { .. } => "PictureWriteFailed",
            StorageError::AccessDenied { .. } => "AccessDenied",
            StorageError::InfrastructureError { .. } => "InfrastructureError",
            StorageError::InternalError { .. } => "InternalError",
        };

        Self {
            error: kind.to_string(),
            message: error.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Body of the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}
