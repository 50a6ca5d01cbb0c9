pub mod dto;
pub mod error;
pub mod handlers;
pub mod multipart;
pub mod router;

pub use dto::*;
pub use error::{ApiError, ApiResult};
pub use handlers::*;
pub use router::*;
