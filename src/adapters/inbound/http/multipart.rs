//! Multipart form handling for product pictures.
//!
//! A product form carries the text fields `name`, `price`, `category.id`,
//! `category.name` and a `file` part. The file part is streamed straight into
//! the picture store as it arrives, so a form that later fails validation has
//! its picture discarded again.

use axum::extract::multipart::{Field, Multipart};
use futures::{StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::{
    adapters::inbound::http::error::{ApiError, ApiResult},
    domain::{
        errors::ValidationError,
        models::{Category, PriceInput, Product, ProductDraft},
        value_objects::{DocumentId, PictureName},
    },
    ports::services::CatalogService,
};

pub const FILE_FIELD: &str = "file";

/// Text and file parts of a product form, not yet validated
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub picture: Option<PictureName>,
}

impl ProductForm {
    /// Validate the form; errors are in field order with `file` last.
    ///
    /// On failure the stored picture, if any, is handed back so the caller can
    /// discard it.
    pub fn validate(self) -> Result<Product, (Vec<ValidationError>, Option<PictureName>)> {
        let mut errors = Vec::new();

        let category = match (self.category_id, self.category_name) {
            (None, None) => None,
            (id, name) => {
                let id = match id.map(DocumentId::new).transpose() {
                    Ok(id) => id,
                    Err(e) => {
                        errors.push(e);
                        None
                    }
                };
                Some(Category {
                    id,
                    name: name.unwrap_or_default(),
                })
            }
        };

        let draft = ProductDraft {
            name: self.name,
            price: self.price.map(PriceInput::Text),
            category,
            ..Default::default()
        };

        let product = match draft.validate() {
            Ok(product) => Some(product),
            Err(mut draft_errors) => {
                draft_errors.append(&mut errors);
                errors = draft_errors;
                None
            }
        };

        match (product, self.picture) {
            (Some(mut product), Some(picture)) if errors.is_empty() => {
                product.picture = Some(picture.into_string());
                Ok(product)
            }
            (_, picture) => {
                if picture.is_none() {
                    errors.push(ValidationError::EmptyField { field: FILE_FIELD });
                }
                Err((errors, picture))
            }
        }
    }
}

/// Read a product form, storing the file part through the catalog service
pub async fn read_product_form(
    multipart: &mut Multipart,
    catalog: &dyn CatalogService,
) -> ApiResult<ProductForm> {
    let mut form = ProductForm::default();

    match read_fields(multipart, catalog, &mut form).await {
        Ok(()) => Ok(form),
        Err(e) => {
            if let Some(picture) = form.picture.take() {
                discard_quietly(catalog, &picture).await;
            }
            Err(e)
        }
    }
}

async fn read_fields(
    multipart: &mut Multipart,
    catalog: &dyn CatalogService,
    form: &mut ProductForm,
) -> ApiResult<()> {
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };

        match field_name.as_str() {
            "name" => form.name = non_empty_text(field).await?,
            "price" => form.price = non_empty_text(field).await?,
            "category.id" => form.category_id = non_empty_text(field).await?,
            "category.name" => form.category_name = non_empty_text(field).await?,
            FILE_FIELD => {
                let Some(filename) = upload_filename(&field) else {
                    continue;
                };
                let picture = catalog
                    .store_picture(&filename, field_bytes(field))
                    .await?;

                // A repeated file part replaces the earlier one
                if let Some(previous) = form.picture.replace(picture) {
                    discard_quietly(catalog, &previous).await;
                }
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(())
}

/// Original file name of a file part; parts without one count as missing
pub fn upload_filename(field: &Field<'_>) -> Option<String> {
    field
        .file_name()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Body of a file part as a byte stream for the picture store
pub fn field_bytes(field: Field<'_>) -> crate::ports::storage::ByteStream<'_> {
    field
        .map_err(|e| std::io::Error::other(e.body_text()))
        .boxed()
}

async fn non_empty_text(field: Field<'_>) -> ApiResult<Option<String>> {
    let text = field.text().await.map_err(malformed)?;
    Ok(if text.is_empty() { None } else { Some(text) })
}

fn malformed(error: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::validation(ValidationError::MalformedBody(error.body_text()))
}

pub async fn discard_quietly(catalog: &dyn CatalogService, picture: &PictureName) {
    if let Err(e) = catalog.discard_picture(picture).await {
        warn!(picture = %picture, error = %e, "Failed to discard unreferenced picture");
    }
}
