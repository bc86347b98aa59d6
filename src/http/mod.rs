//! HTTP/1.1 streams and responses.

pub mod response;
pub mod responsebody;
pub mod streamfactory;

// Re-exports for convenience
pub use response::HttpResponse;
pub use responsebody::ResponseBody;
pub use streamfactory::{HttpStream, HttpStreamFactory};
