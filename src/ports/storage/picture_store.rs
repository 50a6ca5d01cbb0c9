use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::{errors::StorageResult, value_objects::PictureName};

/// Stream of body chunks handed to the picture store
pub type ByteStream<'a> = BoxStream<'a, std::io::Result<Bytes>>;

/// Port for storing uploaded product pictures
#[async_trait]
pub trait PictureStore: Send + Sync + 'static {
    /// Write the stream under a freshly generated name and return that name.
    ///
    /// The file only becomes visible once the whole stream has been written;
    /// a failing stream leaves nothing behind.
    async fn store(&self, original_filename: &str, data: ByteStream<'_>)
        -> StorageResult<PictureName>;

    /// Read a stored picture back
    async fn load(&self, name: &PictureName) -> StorageResult<Bytes>;

    /// Remove a stored picture
    async fn discard(&self, name: &PictureName) -> StorageResult<()>;
}
