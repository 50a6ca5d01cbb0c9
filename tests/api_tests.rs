use axum_test::{
    multipart::{MultipartForm, Part},
    TestServer,
};
use async_trait::async_trait;
use catalog_server::{
    AppBuilder, AppDependencies, Category, CategoryRepository, DocumentId, DocumentRepository,
    InMemoryDocumentRepository, ObjectStorePictureStore, PictureName, PictureStore, Product,
    ProductRepository, StorageError, StorageResult, UpdateStatus,
};
use futures::stream::{self, BoxStream, StreamExt};
use object_store::{memory::InMemory, ObjectStore};
use serde_json::{json, Value};
use std::sync::Arc;

struct TestApp {
    server: TestServer,
    products: Arc<ProductRepository>,
    pictures: Arc<dyn PictureStore>,
    picture_objects: Arc<InMemory>,
}

impl TestApp {
    async fn stored_picture_count(&self) -> usize {
        self.picture_objects.list(None).count().await
    }
}

async fn setup_with_status(update_status: UpdateStatus) -> TestApp {
    let picture_objects = Arc::new(InMemory::new());
    let products: Arc<ProductRepository> = Arc::new(InMemoryDocumentRepository::<Product>::new());
    let categories: Arc<CategoryRepository> = Arc::new(InMemoryDocumentRepository::<Category>::new());
    let pictures: Arc<dyn PictureStore> =
        Arc::new(ObjectStorePictureStore::new(picture_objects.clone()));

    let deps = AppDependencies {
        product_repository: products.clone(),
        category_repository: categories,
        picture_store: pictures.clone(),
    };
    let app = AppBuilder::new()
        .with_update_status(update_status)
        .build_with(deps);

    TestApp {
        server: TestServer::new(app.router()).unwrap(),
        products,
        pictures,
        picture_objects,
    }
}

async fn setup_test_server() -> TestApp {
    setup_with_status(UpdateStatus::Created).await
}

fn ipod() -> Value {
    json!({
        "name": "Apple iPod",
        "price": 46.89,
        "category": { "name": "electronics" }
    })
}

async fn create_product(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/products").json(&body).await;
    assert_eq!(response.status_code(), 201);
    response.json::<Value>()["product"].clone()
}

fn picture_part(filename: &str, data: &'static [u8]) -> Part {
    Part::bytes(data).file_name(filename).mime_type("image/png")
}

#[tokio::test]
async fn test_create_returns_envelope_and_location() {
    let app = setup_test_server().await;

    let response = app.server.post("/api/products").json(&ipod()).await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let id = body["product"]["id"].as_str().unwrap().to_string();

    assert_eq!(response.header("location"), format!("/api/products/{}", id).as_str());
    assert_eq!(body["message"], "Product created successfully.");
    assert_eq!(body["status"], 201);
    assert!(body["timestamp"].is_string());
    assert!(body["product"]["createdAt"].is_string());
    assert_eq!(id.len(), 24);
}

#[tokio::test]
async fn test_empty_name_gives_one_error() {
    let app = setup_test_server().await;

    let response = app
        .server
        .post("/api/products")
        .json(&json!({ "name": "", "price": 10.0, "category": { "name": "sport" } }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("name"));
    assert_eq!(body["status"], 400);
    assert!(body["timestamp"].is_string());

    assert_eq!(app.products.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_name_and_price_give_two_errors() {
    let app = setup_test_server().await;

    let response = app
        .server
        .post("/api/products/plain")
        .json(&json!({ "name": "", "category": { "name": "sport" } }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(
        body["errors"],
        json!([
            "The field name must not be empty",
            "The field price must not be null"
        ])
    );
}

#[tokio::test]
async fn test_negative_and_textual_prices() {
    let app = setup_test_server().await;

    let negative = app
        .server
        .post("/api/products")
        .json(&json!({ "name": "x", "price": -1, "category": { "name": "sport" } }))
        .await;
    assert_eq!(negative.status_code(), 400);
    assert_eq!(
        negative.json::<Value>()["errors"],
        json!(["The field price must be greater than or equal to 0"])
    );

    let textual = app
        .server
        .post("/api/products")
        .json(&json!({ "name": "x", "price": "12.50", "category": { "name": "sport" } }))
        .await;
    assert_eq!(textual.status_code(), 201);
    assert_eq!(textual.json::<Value>()["product"]["price"], 12.5);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_test_server().await;

    let response = app
        .server
        .post("/api/products")
        .content_type("application/json")
        .bytes("{ not json".into())
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_get_unsaved_id_is_not_found() {
    let app = setup_test_server().await;

    let response = app.server.get("/api/products/65a1f0c2e4b0a1b2c3d4e5f6").await;
    assert_eq!(response.status_code(), 404);
    assert!(response.text().is_empty());

    let malformed = app.server.get("/api/products/not%20an%20id").await;
    assert_eq!(malformed.status_code(), 404);
}

#[tokio::test]
async fn test_save_then_fetch_round_trip() {
    let app = setup_test_server().await;

    let created = create_product(&app.server, ipod()).await;
    let id = created["id"].as_str().unwrap();

    let response = app.server.get(&format!("/api/products/{}", id)).await;
    assert_eq!(response.status_code(), 200);

    let fetched: Product = response.json();
    assert_eq!(fetched.name, "Apple iPod");
    assert_eq!(fetched.price, 46.89);
    assert_eq!(fetched.category.name, "electronics");
    assert_eq!(fetched.picture, None);
    assert_eq!(fetched.id.unwrap().as_str(), id);
}

#[tokio::test]
async fn test_list_and_uppercase_list() {
    let app = setup_test_server().await;
    create_product(&app.server, ipod()).await;
    create_product(
        &app.server,
        json!({ "name": "Bianchi Bicicleta", "price": 70.89, "category": { "name": "sport" } }),
    )
    .await;

    let plain: Vec<Product> = app.server.get("/api/products").await.json();
    let names: Vec<_> = plain.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Apple iPod", "Bianchi Bicicleta"]);

    let upper: Vec<Product> = app
        .server
        .get("/api/products")
        .add_query_param("uppercase", true)
        .await
        .json();
    let names: Vec<_> = upper.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["APPLE IPOD", "BIANCHI BICICLETA"]);

    // Nothing was persisted by the upper-cased view
    let again: Vec<Product> = app.server.get("/api/v3/products").await.json();
    assert_eq!(again, plain);
}

#[tokio::test]
async fn test_repeated_uppercase_listing() {
    let app = setup_test_server().await;
    for name in ["tv", "camera", "notebook"] {
        create_product(
            &app.server,
            json!({ "name": name, "price": 1.0, "category": { "name": "electronics" } }),
        )
        .await;
    }

    let response = app.server.get("/api/products/uppercase/repeat").await;
    assert_eq!(response.status_code(), 200);

    let products: Vec<Product> = response.json();
    assert_eq!(products.len(), 5000 * 3);
    assert!(products.iter().all(|p| p.name == p.name.to_uppercase()));
    assert_eq!(products[3].name, "TV");

    let few: Vec<Product> = app
        .server
        .get("/api/v2/products/uppercase/repeat")
        .add_query_param("times", 2)
        .await
        .json();
    assert_eq!(few.len(), 6);

    assert_eq!(app.products.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_repeated_listing_of_empty_store() {
    let app = setup_test_server().await;

    let response = app.server.get("/api/products/uppercase/repeat").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_delete_twice() {
    let app = setup_test_server().await;
    let created = create_product(&app.server, ipod()).await;
    let path = format!("/api/products/{}", created["id"].as_str().unwrap());

    assert_eq!(app.server.delete(&path).await.status_code(), 204);
    assert_eq!(app.server.delete(&path).await.status_code(), 404);
    assert_eq!(app.server.get(&path).await.status_code(), 404);
}

#[tokio::test]
async fn test_update_answers_created_by_default() {
    let app = setup_test_server().await;
    let created = create_product(&app.server, ipod()).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .server
        .put(&format!("/api/products/{}", id))
        .json(&json!({ "name": "Apple iPod Nano", "price": 99.5, "category": { "name": "music" } }))
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(response.header("location"), format!("/api/products/{}", id).as_str());

    let updated: Product = response.json();
    assert_eq!(updated.name, "Apple iPod Nano");
    assert_eq!(updated.price, 99.5);
    assert_eq!(updated.category.name, "music");
    assert!(updated.created_at.is_some());
}

#[tokio::test]
async fn test_update_answers_ok_when_configured() {
    let app = setup_with_status(UpdateStatus::Ok).await;
    let created = create_product(&app.server, ipod()).await;

    let response = app
        .server
        .put(&format!("/api/v2/products/{}", created["id"].as_str().unwrap()))
        .json(&ipod())
        .await;

    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let app = setup_test_server().await;

    let response = app
        .server
        .put("/api/products/65a1f0c2e4b0a1b2c3d4e5f6")
        .json(&ipod())
        .await;

    assert_eq!(response.status_code(), 404);
    assert_eq!(app.products.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_unknown_id_with_incomplete_body_is_not_found() {
    let app = setup_test_server().await;

    let response = app
        .server
        .put("/api/products/65a1f0c2e4b0a1b2c3d4e5f6")
        .json(&json!({ "name": "x" }))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_update_existing_product_validates_body() {
    let app = setup_test_server().await;
    let created = create_product(&app.server, ipod()).await;

    let response = app
        .server
        .put(&format!("/api/products/{}", created["id"].as_str().unwrap()))
        .json(&json!({ "name": "x" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_picture_to_existing_product() {
    let app = setup_test_server().await;
    let created = create_product(&app.server, ipod()).await;
    let id = created["id"].as_str().unwrap();

    let form = MultipartForm::new().add_part("file", picture_part("my photo.png", b"\x89PNG"));
    let response = app
        .server
        .post(&format!("/api/products/upload/{}", id))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 201);
    let uploaded: Product = response.json();
    let picture = uploaded.picture.clone().unwrap();
    assert_ne!(picture, "my photo.png");
    assert!(picture.ends_with("-myphoto.png"));
    assert!(picture.len() > "-myphoto.png".len());

    let fetched: Product = app.server.get(&format!("/api/products/{}", id)).await.json();
    assert_eq!(fetched.picture, Some(picture.clone()));

    let content = app
        .pictures
        .load(&PictureName::from_stored(picture))
        .await
        .unwrap();
    assert_eq!(content.as_ref(), b"\x89PNG");
}

#[tokio::test]
async fn test_upload_keeps_picture_at_top_level() {
    let app = setup_test_server().await;
    let created = create_product(&app.server, ipod()).await;

    let form =
        MultipartForm::new().add_part("file", picture_part("../dir/evil name.png", b"data"));
    let response = app
        .server
        .post(&format!(
            "/api/products/upload/{}",
            created["id"].as_str().unwrap()
        ))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 201);
    let picture = response.json::<Product>().picture.unwrap();
    assert!(!picture.contains('/'));

    let content = app
        .pictures
        .load(&PictureName::from_stored(picture))
        .await
        .unwrap();
    assert_eq!(content.as_ref(), b"data");
}

#[tokio::test]
async fn test_upload_to_unknown_product() {
    let app = setup_test_server().await;

    let form = MultipartForm::new().add_part("file", picture_part("a.png", b"data"));
    let response = app
        .server
        .post("/api/products/upload/65a1f0c2e4b0a1b2c3d4e5f6")
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 404);
    assert_eq!(app.stored_picture_count().await, 0);
}

#[tokio::test]
async fn test_upload_without_file_is_bad_request() {
    let app = setup_test_server().await;
    let created = create_product(&app.server, ipod()).await;

    let form = MultipartForm::new().add_text("comment", "no picture here");
    let response = app
        .server
        .post(&format!(
            "/api/products/upload/{}",
            created["id"].as_str().unwrap()
        ))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<Value>()["errors"],
        json!(["The field file must not be empty"])
    );
}

#[tokio::test]
async fn test_multipart_create_with_picture() {
    let app = setup_test_server().await;

    let form = MultipartForm::new()
        .add_text("name", "Sony Notebook")
        .add_text("price", "846.89")
        .add_text("category.name", "computation")
        .add_part("file", picture_part("note book.png", b"notebook"));

    let response = app.server.post("/api/products/v2").multipart(form).await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["message"], "Product created successfully.");

    let product: Product = serde_json::from_value(body["product"].clone()).unwrap();
    assert_eq!(product.name, "Sony Notebook");
    assert_eq!(product.price, 846.89);
    assert_eq!(product.category.name, "computation");
    assert!(product.picture.unwrap().ends_with("-notebook.png"));
    assert!(product.created_at.is_some());
    assert_eq!(
        response.header("location"),
        format!("/api/products/{}", product.id.unwrap()).as_str()
    );
}

/// Product collection that rejects every write
struct ReadOnlyProducts;

#[async_trait]
impl DocumentRepository<Product> for ReadOnlyProducts {
    fn find_all(&self) -> BoxStream<'static, StorageResult<Product>> {
        stream::empty().boxed()
    }

    async fn find_by_id(&self, _id: &DocumentId) -> StorageResult<Option<Product>> {
        Ok(None)
    }

    async fn save(&self, _entity: Product) -> StorageResult<Product> {
        Err(StorageError::AccessDenied {
            operation: "save".to_string(),
        })
    }

    async fn delete(&self, _entity: &Product) -> StorageResult<()> {
        Ok(())
    }

    async fn count(&self) -> StorageResult<u64> {
        Ok(0)
    }

    async fn delete_all(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_multipart_create_discards_picture_when_save_fails() {
    let picture_objects = Arc::new(InMemory::new());
    let deps = AppDependencies {
        product_repository: Arc::new(ReadOnlyProducts),
        category_repository: Arc::new(InMemoryDocumentRepository::<Category>::new()),
        picture_store: Arc::new(ObjectStorePictureStore::new(picture_objects.clone())),
    };
    let server = TestServer::new(AppBuilder::new().build_with(deps).router()).unwrap();

    let form = MultipartForm::new()
        .add_text("name", "Sony Notebook")
        .add_text("price", "846.89")
        .add_text("category.name", "computation")
        .add_part("file", picture_part("notebook.png", b"png"));

    let response = server.post("/api/products/v2").multipart(form).await;

    assert_eq!(response.status_code(), 403);
    assert_eq!(picture_objects.list(None).count().await, 0);
}

#[tokio::test]
async fn test_multipart_create_bare_alias() {
    let app = setup_test_server().await;

    let form = MultipartForm::new()
        .add_text("name", "Bianchi Bicicleta")
        .add_text("price", "70.89")
        .add_text("category.name", "sport")
        .add_part("file", picture_part("bike.png", b"bike"));

    let response = app.server.post("/api/v2/products/create").multipart(form).await;

    assert_eq!(response.status_code(), 201);
    let product: Product = response.json();
    assert_eq!(product.name, "Bianchi Bicicleta");
    assert!(product.picture.is_some());
}

#[tokio::test]
async fn test_multipart_validation_discards_picture() {
    let app = setup_test_server().await;

    let form = MultipartForm::new()
        .add_text("name", "")
        .add_text("price", "")
        .add_text("category.name", "sport")
        .add_part("file", picture_part("bike.png", b"bike"));

    let response = app.server.post("/api/products/create/v2").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<Value>()["errors"],
        json!([
            "The field name must not be null",
            "The field price must not be null"
        ])
    );
    assert_eq!(app.products.count().await.unwrap(), 0);
    assert_eq!(app.stored_picture_count().await, 0);
}

#[tokio::test]
async fn test_multipart_create_requires_file() {
    let app = setup_test_server().await;

    let form = MultipartForm::new()
        .add_text("name", "Apple iPod")
        .add_text("price", "46.89")
        .add_text("category.name", "electronics");

    let response = app.server.post("/api/products/v2").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<Value>()["errors"],
        json!(["The field file must not be empty"])
    );
}

#[tokio::test]
async fn test_location_is_canonical_for_v2_prefix() {
    let app = setup_test_server().await;

    let response = app.server.post("/api/v2/products/plain").json(&ipod()).await;

    assert_eq!(response.status_code(), 201);
    let product: Product = response.json();
    let id = product.id.unwrap();
    assert_eq!(response.header("location"), format!("/api/products/{}", id).as_str());

    let via_v2 = app.server.get(&format!("/api/v2/products/{}", id)).await;
    assert_eq!(via_v2.status_code(), 200);
}

#[tokio::test]
async fn test_category_lifecycle() {
    let app = setup_test_server().await;

    let response = app
        .server
        .post("/api/categories")
        .json(&json!({ "name": "furniture" }))
        .await;
    assert_eq!(response.status_code(), 201);
    let category: Value = response.json();
    let id = category["id"].as_str().unwrap().to_string();
    assert_eq!(response.header("location"), format!("/api/categories/{}", id).as_str());

    let listed: Value = app.server.get("/api/categories").await.json();
    assert_eq!(listed, json!([{ "id": id, "name": "furniture" }]));

    let fetched = app.server.get(&format!("/api/categories/{}", id)).await;
    assert_eq!(fetched.status_code(), 200);

    let path = format!("/api/categories/{}", id);
    assert_eq!(app.server.delete(&path).await.status_code(), 204);
    assert_eq!(app.server.delete(&path).await.status_code(), 404);
}

#[tokio::test]
async fn test_category_requires_name() {
    let app = setup_test_server().await;

    let response = app.server.post("/api/categories").json(&json!({})).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<Value>()["errors"],
        json!(["The field name must not be null"])
    );
}

#[tokio::test]
async fn test_category_delete_leaves_products() {
    let app = setup_test_server().await;

    let category: Value = app
        .server
        .post("/api/categories")
        .json(&json!({ "name": "electronics" }))
        .await
        .json();

    let created = create_product(
        &app.server,
        json!({ "name": "Apple iPod", "price": 46.89, "category": category.clone() }),
    )
    .await;

    let deleted = app
        .server
        .delete(&format!("/api/categories/{}", category["id"].as_str().unwrap()))
        .await;
    assert_eq!(deleted.status_code(), 204);

    let product: Value = app
        .server
        .get(&format!("/api/products/{}", created["id"].as_str().unwrap()))
        .await
        .json();
    assert_eq!(product["category"], category);
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_server().await;

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}
