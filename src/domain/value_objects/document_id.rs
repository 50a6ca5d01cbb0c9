use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

const MAX_LENGTH: usize = 128;

/// A validated, store-assigned document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a new DocumentId with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyDocumentId);
        }

        if value.len() > MAX_LENGTH {
            return Err(ValidationError::DocumentIdTooLong {
                actual: value.len(),
                max: MAX_LENGTH,
            });
        }

        // Ids end up in URLs and Location headers
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ValidationError::InvalidDocumentIdCharacter(c));
        }

        Ok(Self(value))
    }

    /// Generate a fresh id in the same shape the document store assigns (24 hex chars)
    pub fn generate() -> Self {
        Self(ObjectId::new().to_hex())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DocumentId::new(value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
