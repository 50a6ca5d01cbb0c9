//! MongoDB implementation of DocumentRepository

use async_trait::async_trait;
use futures::{
    future,
    stream::{self, BoxStream},
    StreamExt, TryStreamExt,
};
use mongodb::{
    bson::{self, doc, Bson},
    options::{ClientOptions, FindOptions, ReplaceOptions},
    Client, Collection, Database,
};
use std::{marker::PhantomData, time::Duration};
use tracing::{info, instrument};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::Document,
        value_objects::DocumentId,
    },
    ports::repositories::DocumentRepository,
};

/// MongoDB connection settings
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    pub url: String,
    pub database: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }
}

/// Connect to MongoDB and verify the server answers a ping
pub async fn connect(config: &MongoConfig) -> StorageResult<Database> {
    info!("Attempting to connect to MongoDB at {}", config.url);

    let mut options = ClientOptions::parse(&config.url).await?;
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));
    options.app_name = Some("catalog-server".to_string());

    let client = Client::with_options(options)?;
    let database = client.database(&config.database);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| StorageError::InfrastructureError {
            message: format!("MongoDB did not answer ping: {}", e),
            source: Some(e.to_string()),
        })?;

    info!(database = %config.database, "Successfully connected to MongoDB");
    Ok(database)
}

/// MongoDB implementation of DocumentRepository.
///
/// Entities are stored with their id in `_id` (as a string); every other
/// field keeps its serde name.
pub struct MongoDocumentRepository<T: Document> {
    collection: Collection<bson::Document>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Document> MongoDocumentRepository<T> {
    /// Repository over the entity's default collection
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, T::COLLECTION)
    }

    /// Repository over a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<bson::Document>(collection_name),
            _entity: PhantomData,
        }
    }

    fn id_filter(id: &DocumentId) -> bson::Document {
        doc! { "_id": id.as_str() }
    }

    fn to_stored(entity: &T, id: &DocumentId) -> StorageResult<bson::Document> {
        let mut document = bson::to_document(entity)?;
        document.remove("id");
        document.insert("_id", id.as_str());
        Ok(document)
    }

    fn from_stored(mut document: bson::Document) -> StorageResult<T> {
        if let Some(id) = document.remove("_id") {
            // Documents written by other tools may carry a native ObjectId
            let id = match id {
                Bson::ObjectId(oid) => Bson::String(oid.to_hex()),
                other => other,
            };
            document.insert("id", id);
        }
        Ok(bson::from_document(document)?)
    }
}

#[async_trait]
impl<T: Document> DocumentRepository<T> for MongoDocumentRepository<T> {
    fn find_all(&self) -> BoxStream<'static, StorageResult<T>> {
        let collection = self.collection.clone();
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();

        stream::once(async move { collection.find(doc! {}).with_options(options).await })
            .map_err(StorageError::from)
            .map_ok(|cursor| cursor.map_err(StorageError::from))
            .try_flatten()
            .and_then(|document| future::ready(Self::from_stored(document)))
            .boxed()
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn find_by_id(&self, id: &DocumentId) -> StorageResult<Option<T>> {
        self.collection
            .find_one(Self::id_filter(id))
            .await?
            .map(Self::from_stored)
            .transpose()
    }

    #[instrument(skip(self, entity), fields(collection = T::COLLECTION))]
    async fn save(&self, mut entity: T) -> StorageResult<T> {
        match entity.id().cloned() {
            Some(id) => {
                let document = Self::to_stored(&entity, &id)?;
                let options = ReplaceOptions::builder().upsert(true).build();
                self.collection
                    .replace_one(Self::id_filter(&id), document)
                    .with_options(options)
                    .await?;
            }
            None => {
                let id = DocumentId::generate();
                let document = Self::to_stored(&entity, &id)?;
                self.collection.insert_one(document).await?;
                entity.set_id(id);
            }
        }

        Ok(entity)
    }

    #[instrument(skip(self, entity), fields(collection = T::COLLECTION))]
    async fn delete(&self, entity: &T) -> StorageResult<()> {
        let id = entity.id().ok_or_else(|| StorageError::InternalError {
            message: format!("Cannot delete an unsaved {} document", T::COLLECTION),
        })?;

        let result = self.collection.delete_one(Self::id_filter(id)).await?;
        if result.deleted_count == 0 {
            return Err(StorageError::DocumentNotFound {
                collection: T::COLLECTION,
                id: id.clone(),
            });
        }

        Ok(())
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn count(&self) -> StorageResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    async fn delete_all(&self) -> StorageResult<()> {
        self.collection.drop().await?;
        info!(collection = T::COLLECTION, "Collection dropped");
        Ok(())
    }
}
