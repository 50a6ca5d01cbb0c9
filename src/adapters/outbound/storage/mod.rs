// Infrastructure error conversions
pub mod error;

// Picture storage on top of object_store
pub mod object_store_picture_store;

pub use object_store_picture_store::ObjectStorePictureStore;
