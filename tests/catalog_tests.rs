use bytes::Bytes;
use catalog_server::{
    create_in_memory_app, seed_sample_data, AppBuilder, ByteStream, CatalogService, Category,
    DocumentId, Product, ProductChanges,
};
use futures::{stream, StreamExt, TryStreamExt};

fn bytes_stream(data: &'static [u8]) -> ByteStream<'static> {
    stream::iter(vec![Ok(Bytes::from_static(data))]).boxed()
}

#[tokio::test]
async fn seeded_catalog_is_listed_in_insertion_order() {
    let builder = AppBuilder::new();
    let deps = builder.build_dependencies().await.unwrap();
    seed_sample_data(&deps).await.unwrap();
    let services = builder.build_with(deps);

    let products: Vec<Product> = services
        .catalog_service
        .list_all()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(products.len(), 9);
    assert_eq!(products[0].name, "TV Panasonic Pantalla LCD");
    assert_eq!(products[8].name, "TV Sony Bravia OLED 4K Ultra HD");
    assert_eq!(products[7].name, "Mica Cómoda 5 Cajones");
    assert_eq!(products[7].category.name, "furniture");

    let categories: Vec<Category> = services
        .catalog_service
        .list_categories()
        .try_collect()
        .await
        .unwrap();
    let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["electronics", "sport", "computation", "furniture"]);
}

#[tokio::test]
async fn repeated_uppercase_listing_of_seeded_catalog() {
    let builder = AppBuilder::new();
    let deps = builder.build_dependencies().await.unwrap();
    seed_sample_data(&deps).await.unwrap();
    let products = deps.product_repository.clone();
    let services = builder.build_with(deps);

    let repeated: Vec<Product> = services
        .catalog_service
        .list_all_name_uppercased_repeated(5000)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(repeated.len(), 5000 * 9);
    assert!(repeated.iter().all(|p| p.name == p.name.to_uppercase()));
    assert_eq!(repeated[9].name, "TV PANASONIC PANTALLA LCD");
    assert_eq!(products.count().await.unwrap(), 9);

    let stored: Vec<Product> = products.find_all().try_collect().await.unwrap();
    assert_eq!(stored[0].name, "TV Panasonic Pantalla LCD");
}

#[tokio::test]
async fn create_update_delete() {
    let services = create_in_memory_app().await.unwrap();
    let catalog = &services.catalog_service;

    let created = catalog
        .create(Product::new("Sony Notebook", 846.89, Category::new("computation")))
        .await
        .unwrap();
    let id = created.id.clone().unwrap();
    assert!(created.created_at.is_some());

    let updated = catalog
        .update(
            &id,
            ProductChanges {
                name: "Sony Vaio".to_string(),
                price: 799.0,
                category: Category::new("computation"),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Sony Vaio");
    assert_eq!(updated.created_at, created.created_at);

    assert_eq!(catalog.delete(&id).await.unwrap(), Some(()));
    assert_eq!(catalog.delete(&id).await.unwrap(), None);
    assert_eq!(catalog.get_by_id(&id).await.unwrap(), None);
}

#[tokio::test]
async fn picture_upload_sets_reference() {
    let services = create_in_memory_app().await.unwrap();
    let catalog = &services.catalog_service;

    let created = catalog
        .create(Product::new("Apple iPod", 46.89, Category::new("electronics")))
        .await
        .unwrap();
    let id = created.id.unwrap();

    let uploaded = catalog
        .upload_picture(&id, "front view.jpg", bytes_stream(b"jpeg"))
        .await
        .unwrap()
        .unwrap();

    let picture = uploaded.picture.unwrap();
    assert!(picture.ends_with("-frontview.jpg"));
    assert_ne!(picture, "front view.jpg");
}

#[tokio::test]
async fn failed_picture_write_persists_nothing() {
    let services = create_in_memory_app().await.unwrap();
    let catalog = &services.catalog_service;

    let created = catalog
        .create(Product::new("Apple iPod", 46.89, Category::new("electronics")))
        .await
        .unwrap();
    let id = created.id.unwrap();

    let broken: ByteStream<'static> = stream::iter(vec![
        Ok(Bytes::from_static(b"partial")),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "client went away",
        )),
    ])
    .boxed();

    assert!(catalog
        .upload_picture(&id, "a.png", broken)
        .await
        .is_err());

    let reloaded = catalog.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(reloaded.picture, None);
}

#[tokio::test]
async fn unknown_ids_are_empty_results() {
    let services = create_in_memory_app().await.unwrap();
    let catalog = &services.catalog_service;
    let id = DocumentId::generate();

    assert!(catalog.get_by_id(&id).await.unwrap().is_none());
    assert!(catalog.get_category(&id).await.unwrap().is_none());
    assert!(catalog.delete_category(&id).await.unwrap().is_none());
    assert!(catalog
        .upload_picture(&id, "a.png", bytes_stream(b"x"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn save_inserts_then_replaces() {
    let services = create_in_memory_app().await.unwrap();
    let catalog = &services.catalog_service;

    let mut saved = catalog
        .save(Product::new("HP Notebook Omen 17", 2500.89, Category::new("computation")))
        .await
        .unwrap();
    assert!(saved.id.is_some());
    assert!(saved.created_at.is_none());

    saved.price = 2400.0;
    let replaced = catalog.save(saved.clone()).await.unwrap();
    assert_eq!(replaced, saved);

    let all: Vec<Product> = catalog.list_all().try_collect().await.unwrap();
    assert_eq!(all, vec![saved]);
}
