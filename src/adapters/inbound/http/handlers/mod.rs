pub mod category_handlers;
pub mod product_handlers;

pub use category_handlers::*;
pub use product_handlers::*;
