mod document_id;
mod picture_name;

pub use document_id::DocumentId;
pub use picture_name::PictureName;
