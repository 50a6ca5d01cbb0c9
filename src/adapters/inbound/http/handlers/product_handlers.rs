use axum::{
    body::{Body, Bytes},
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{future, stream, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::{
    adapters::inbound::http::{
        dto::{ListProductsDto, ProductCreatedDto, RepeatProductsDto},
        error::{ApiError, ApiResult},
        multipart::{
            discard_quietly, field_bytes, read_product_form, upload_filename, FILE_FIELD,
        },
        router::AppState,
    },
    domain::{
        errors::{StorageError, ValidationError},
        models::{Product, ProductChanges, ProductDraft},
        value_objects::{DocumentId, PictureName},
    },
};

/// Path under which every product is addressable, whatever prefix it was created through
const PRODUCT_LOCATION_PREFIX: &str = "/api/products/";

/// Resolve a path id; ids that cannot exist are simply not found
pub(crate) fn parse_id(raw: String) -> ApiResult<DocumentId> {
    DocumentId::new(raw).map_err(|_| ApiError::NotFound)
}

fn location(product: &Product) -> ApiResult<HeaderMap> {
    let id = product.id.as_ref().ok_or_else(|| StorageError::InternalError {
        message: "Persisted product has no id".to_string(),
    })?;

    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("{}{}", PRODUCT_LOCATION_PREFIX, id))
        .map_err(|e| StorageError::InternalError {
            message: format!("Invalid Location header: {}", e),
        })?;
    headers.insert(header::LOCATION, value);
    Ok(headers)
}

fn validated(payload: Result<Json<ProductDraft>, JsonRejection>) -> ApiResult<Product> {
    let Json(draft) = payload?;
    Ok(draft.validate()?)
}

/// Handle product listing, optionally with upper-cased names
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(params): Query<ListProductsDto>,
) -> ApiResult<Json<Vec<Product>>> {
    let catalog = &app_state.catalog_service;

    if !params.uppercase {
        let products: Vec<Product> = catalog.list_all().try_collect().await?;
        return Ok(Json(products));
    }

    let products: Vec<Product> = catalog
        .list_all_name_uppercased()
        .inspect_ok(|product| info!(name = %product.name, "Listing product"))
        .try_collect()
        .await?;

    Ok(Json(products))
}

/// Stream the upper-cased listing repeated `times` times as one JSON array
pub async fn list_products_uppercase_repeated(
    State(app_state): State<AppState>,
    Query(params): Query<RepeatProductsDto>,
) -> Response {
    let times = params.times();
    debug!(times, "Streaming repeated product listing");

    let items = app_state
        .catalog_service
        .list_all_name_uppercased_repeated(times)
        .enumerate()
        .map(|(index, item)| {
            let product = item?;
            let mut buffer = if index == 0 { Vec::new() } else { vec![b','] };
            serde_json::to_writer(&mut buffer, &product).map_err(|e| {
                StorageError::SerializationError {
                    message: e.to_string(),
                }
            })?;
            Ok::<_, StorageError>(Bytes::from(buffer))
        });

    let body = stream::once(future::ready(Ok(Bytes::from_static(b"["))))
        .chain(items)
        .chain(stream::once(future::ready(Ok(Bytes::from_static(b"]")))));

    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(body),
    )
        .into_response()
}

/// Handle product retrieval
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let id = parse_id(id)?;

    app_state
        .catalog_service
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Handle product creation, answering with the creation envelope
pub async fn create_product(
    State(app_state): State<AppState>,
    payload: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, HeaderMap, Json<ProductCreatedDto>)> {
    let product = validated(payload)?;
    let saved = app_state.catalog_service.create(product).await?;

    Ok((
        StatusCode::CREATED,
        location(&saved)?,
        Json(ProductCreatedDto::new(saved)),
    ))
}

/// Handle product creation, answering with the bare product
pub async fn create_product_plain(
    State(app_state): State<AppState>,
    payload: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, HeaderMap, Json<Product>)> {
    let product = validated(payload)?;
    let saved = app_state.catalog_service.create(product).await?;

    Ok((StatusCode::CREATED, location(&saved)?, Json(saved)))
}

async fn create_from_form(
    app_state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Product> {
    let mut multipart = multipart.map_err(|e| {
        ApiError::validation(ValidationError::MalformedBody(e.body_text()))
    })?;
    let catalog = app_state.catalog_service.as_ref();

    let product = match read_product_form(&mut multipart, catalog).await?.validate() {
        Ok(product) => product,
        Err((errors, picture)) => {
            if let Some(picture) = picture {
                discard_quietly(catalog, &picture).await;
            }
            return Err(ApiError::Validation(errors));
        }
    };

    let picture = product.picture.clone();
    match catalog.create(product).await {
        Ok(saved) => Ok(saved),
        Err(e) => {
            if let Some(picture) = picture {
                discard_quietly(catalog, &PictureName::from_stored(picture)).await;
            }
            Err(e.into())
        }
    }
}

/// Handle multipart product creation with a picture, answering with the envelope
pub async fn create_product_with_picture(
    State(app_state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, HeaderMap, Json<ProductCreatedDto>)> {
    let saved = create_from_form(&app_state, multipart).await?;

    Ok((
        StatusCode::CREATED,
        location(&saved)?,
        Json(ProductCreatedDto::new(saved)),
    ))
}

/// Handle multipart product creation with a picture, answering with the bare product
pub async fn create_product_with_picture_plain(
    State(app_state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, HeaderMap, Json<Product>)> {
    let saved = create_from_form(&app_state, multipart).await?;

    Ok((StatusCode::CREATED, location(&saved)?, Json(saved)))
}

/// Handle picture upload for an existing product
pub async fn upload_product_picture(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, HeaderMap, Json<Product>)> {
    let id = parse_id(id)?;
    let catalog = &app_state.catalog_service;

    // Unknown products are rejected before the body is read
    if catalog.get_by_id(&id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let mut multipart = multipart.map_err(|e| {
        ApiError::validation(ValidationError::MalformedBody(e.body_text()))
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::validation(ValidationError::MalformedBody(e.body_text()))
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = upload_filename(&field) else {
            continue;
        };

        let saved = catalog
            .upload_picture(&id, &filename, field_bytes(field))
            .await?
            .ok_or(ApiError::NotFound)?;

        return Ok((StatusCode::CREATED, location(&saved)?, Json(saved)));
    }

    Err(ApiError::validation(ValidationError::EmptyField {
        field: FILE_FIELD,
    }))
}

/// Handle product update
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, HeaderMap, Json<Product>)> {
    let id = parse_id(id)?;
    let catalog = &app_state.catalog_service;

    // Unknown products answer 404 whatever the body holds
    if catalog.get_by_id(&id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    let changes = ProductChanges::from(validated(payload)?);

    let saved = catalog
        .update(&id, changes)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok((app_state.update_status, location(&saved)?, Json(saved)))
}

/// Handle product deletion
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(id)?;

    app_state
        .catalog_service
        .delete(&id)
        .await?
        .map(|()| StatusCode::NO_CONTENT)
        .ok_or(ApiError::NotFound)
}
