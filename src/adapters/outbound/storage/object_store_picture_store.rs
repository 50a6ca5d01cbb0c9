use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    buffered::BufWriter, local::LocalFileSystem, path::Path as ObjectPath,
    ObjectStore as ApacheObjectStore,
};
use std::{path::Path, sync::Arc};
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        value_objects::PictureName,
    },
    ports::storage::{ByteStream, PictureStore},
};

/// Picture store backed by Apache object_store.
///
/// Production uses a `LocalFileSystem` rooted at the upload directory;
/// tests use `InMemory`.
pub struct ObjectStorePictureStore {
    inner: Arc<dyn ApacheObjectStore>,
}

impl ObjectStorePictureStore {
    pub fn new(store: Arc<dyn ApacheObjectStore>) -> Self {
        Self { inner: store }
    }

    /// Store pictures as files under `directory`, creating it when missing
    pub async fn local(directory: impl AsRef<Path>) -> StorageResult<Self> {
        let directory = directory.as_ref();
        tokio::fs::create_dir_all(directory).await?;

        let store = LocalFileSystem::new_with_prefix(directory)?;
        info!(directory = %directory.display(), "Picture uploads directory ready");

        Ok(Self::new(Arc::new(store)))
    }

    fn path_for(name: &PictureName) -> ObjectPath {
        ObjectPath::from(name.as_str())
    }
}

#[async_trait]
impl PictureStore for ObjectStorePictureStore {
    async fn store(
        &self,
        original_filename: &str,
        data: ByteStream<'_>,
    ) -> StorageResult<PictureName> {
        let name = PictureName::generate(original_filename);
        debug!(picture = %name, original = %original_filename, "Writing picture");

        let mut reader = StreamReader::new(data);
        let mut writer = BufWriter::new(self.inner.clone(), Self::path_for(&name));

        // Nothing is visible in the store until shutdown completes
        let written = match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(bytes) => writer.shutdown().await.map(|_| bytes),
            Err(e) => Err(e),
        };

        match written {
            Ok(bytes) => {
                info!(picture = %name, bytes, "Picture stored");
                Ok(name)
            }
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    warn!(picture = %name, error = %abort_err, "Failed to abort picture upload");
                }
                Err(StorageError::PictureWriteFailed {
                    filename: name.into_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    async fn load(&self, name: &PictureName) -> StorageResult<Bytes> {
        let result = self.inner.get(&Self::path_for(name)).await?;
        Ok(result.bytes().await?)
    }

    async fn discard(&self, name: &PictureName) -> StorageResult<()> {
        self.inner.delete(&Self::path_for(name)).await?;
        info!(picture = %name, "Picture discarded");
        Ok(())
    }
}
