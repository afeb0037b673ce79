//! External query executor boundary.
//!
//! The compiler never executes anything; it hands a `QueryDescriptor` to an
//! implementation of this trait and gets pages back asynchronously. Errors
//! are surfaced to the UI as retryable failures; the widget's existing
//! window is left untouched.

use async_trait::async_trait;

use mosaic_api::{PageWindow, QueryDescriptor};

/// A fetched row. Shapes are only known at runtime, so rows stay dynamic.
pub type Row = serde_json::Value;

/// Failure of a page fetch. Both variants are retryable.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("backend rejected query: {message}")]
    Backend { message: String },
}

/// Executes compiled query descriptors against the backend.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Fetch one page of results for the descriptor, starting after the
    /// given cursor (or from the beginning when `None`).
    async fn fetch_page(
        &self,
        descriptor: &QueryDescriptor,
        after: Option<&str>,
    ) -> Result<PageWindow<Row>, FetchError>;
}
