use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    dto::HealthDto,
    handlers::{
        create_category, create_product, create_product_plain, create_product_with_picture,
        create_product_with_picture_plain, delete_category, delete_product, get_category,
        get_product, list_categories, list_products, list_products_uppercase_repeated,
        update_product, upload_product_picture,
    },
};
use crate::ports::services::CatalogService;

/// Largest request body accepted, picture uploads included
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<dyn CatalogService>,
    /// Status answered by a successful product update
    pub update_status: StatusCode,
}

impl AppState {
    pub fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
            update_status: StatusCode::CREATED,
        }
    }

    pub fn with_update_status(mut self, status: StatusCode) -> Self {
        self.update_status = status;
        self
    }
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/products", create_product_router())
        .nest("/api/v2/products", create_product_router())
        .route("/api/v3/products", get(list_products))
        .nest("/api/categories", create_category_router())
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create a router with just product operations
pub fn create_product_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/uppercase/repeat", get(list_products_uppercase_repeated))
        .route("/plain", post(create_product_plain))
        .route("/v2", post(create_product_with_picture))
        .route("/create/v2", post(create_product_with_picture))
        .route("/create", post(create_product_with_picture_plain))
        .route("/upload/{id}", post(upload_product_picture))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// Create a router with just category operations
pub fn create_category_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", get(get_category).delete(delete_category))
}

async fn health() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}
