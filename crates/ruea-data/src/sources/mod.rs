//! Transports: where API responses come from

pub mod http_source;
pub mod memory_source;

pub use http_source::HttpTransport;
pub use memory_source::MemoryTransport;

use async_trait::async_trait;
use ruea_core::QueryParams;
use serde_json::Value;

use crate::RequestError;

/// Issues GET requests against the versioned API and decodes JSON bodies.
///
/// Implementations never retry: a failed call is returned to the caller,
/// which decides whether to fall back.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` (relative to `/api/v1`) with the given query parameters
    async fn get_json(&self, path: &str, params: &QueryParams) -> Result<Value, RequestError>;

    /// Get the source name for display
    fn source_name(&self) -> &str;
}
