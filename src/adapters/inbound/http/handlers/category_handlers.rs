use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use futures::TryStreamExt;

use crate::{
    adapters::inbound::http::{
        dto::CreateCategoryDto,
        error::{ApiError, ApiResult},
        handlers::product_handlers::parse_id,
        router::AppState,
    },
    domain::{errors::StorageError, models::Category},
};

/// Handle category listing
pub async fn list_categories(State(app_state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories: Vec<Category> = app_state
        .catalog_service
        .list_categories()
        .try_collect()
        .await?;

    Ok(Json(categories))
}

/// Handle category retrieval
pub async fn get_category(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    let id = parse_id(id)?;

    app_state
        .catalog_service
        .get_category(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Handle category creation
pub async fn create_category(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateCategoryDto>, JsonRejection>,
) -> ApiResult<(StatusCode, HeaderMap, Json<Category>)> {
    let Json(dto) = payload?;
    let saved = app_state
        .catalog_service
        .save_category(dto.into_category()?)
        .await?;

    let id = saved.id.as_ref().ok_or_else(|| StorageError::InternalError {
        message: "Persisted category has no id".to_string(),
    })?;
    let location = HeaderValue::from_str(&format!("/api/categories/{}", id)).map_err(|e| {
        StorageError::InternalError {
            message: format!("Invalid Location header: {}", e),
        }
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(saved)))
}

/// Handle category deletion; products embedding the category keep their copy
pub async fn delete_category(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(id)?;

    app_state
        .catalog_service
        .delete_category(&id)
        .await?
        .map(|()| StatusCode::NO_CONTENT)
        .ok_or(ApiError::NotFound)
}
