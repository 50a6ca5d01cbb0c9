use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    errors::ValidationError,
    models::{Category, Document},
    value_objects::DocumentId,
};

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: Option<DocumentId>,
    pub name: String,
    pub price: f64,
    pub category: Category,
    /// Stored file name of the product picture
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64, category: Category) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            category,
            picture: None,
            created_at: None,
        }
    }

    /// Copy of this product with the name upper-cased
    pub fn with_uppercased_name(mut self) -> Self {
        self.name = self.name.to_uppercase();
        self
    }

    /// Overwrite the editable fields with the given changes
    pub fn apply_changes(&mut self, changes: ProductChanges) {
        self.name = changes.name;
        self.price = changes.price;
        self.category = changes.category;
    }
}

impl Document for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }
}

/// The editable fields of a product, as carried by an update request
#[derive(Debug, Clone, PartialEq)]
pub struct ProductChanges {
    pub name: String,
    pub price: f64,
    pub category: Category,
}

impl From<Product> for ProductChanges {
    fn from(product: Product) -> Self {
        Self {
            name: product.name,
            price: product.price,
            category: product.category,
        }
    }
}

/// Price as it arrives from a client: JSON number or text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    fn parse(&self) -> Result<f64, String> {
        let value = match self {
            PriceInput::Number(n) => *n,
            PriceInput::Text(raw) => raw.trim().parse::<f64>().map_err(|_| raw.clone())?,
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(value.to_string())
        }
    }
}

/// A possibly incomplete product payload, validated before it becomes a `Product`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<PriceInput>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductDraft {
    /// Check required fields and build the product.
    ///
    /// Errors come back in field order (name, price, category), at most one per field.
    pub fn validate(self) -> Result<Product, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let name = match self.name {
            None => {
                errors.push(ValidationError::MissingField { field: "name" });
                None
            }
            Some(name) if name.trim().is_empty() => {
                errors.push(ValidationError::EmptyField { field: "name" });
                None
            }
            Some(name) => Some(name),
        };

        let price = match self.price {
            None => {
                errors.push(ValidationError::MissingField { field: "price" });
                None
            }
            Some(input) => match input.parse() {
                Ok(value) if value < 0.0 => {
                    errors.push(ValidationError::Negative { field: "price" });
                    None
                }
                Ok(value) => Some(value),
                Err(raw) => {
                    errors.push(ValidationError::NotANumber {
                        field: "price",
                        value: raw,
                    });
                    None
                }
            },
        };

        if self.category.is_none() {
            errors.push(ValidationError::MissingField { field: "category" });
        }

        match (name, price, self.category) {
            (Some(name), Some(price), Some(category)) if errors.is_empty() => Ok(Product {
                id: None,
                name,
                price,
                category,
                picture: self.picture,
                created_at: self.created_at,
            }),
            _ => Err(errors),
        }
    }
}
