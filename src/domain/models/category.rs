use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::ValidationError, models::Document, value_objects::DocumentId,
};

/// A product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: Option<DocumentId>,
    #[serde(default)]
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Check the fields required before a category can be saved on its own
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        if self.name.trim().is_empty() {
            return Err(vec![ValidationError::EmptyField { field: "name" }]);
        }
        Ok(())
    }
}

impl Document for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }
}
