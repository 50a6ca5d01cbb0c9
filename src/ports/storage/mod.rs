mod picture_store;

pub use picture_store::{ByteStream, PictureStore};
