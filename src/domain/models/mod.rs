pub mod category;
pub mod document;
pub mod product;

pub use category::*;
pub use document::*;
pub use product::*;
