//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{CompletionRequest, DomainError};
use bytes::Bytes;
use futures::stream::BoxStream;

/// Raw event-stream body of a streaming completion, chunked as the transport delivers it.
pub type ByteStream = BoxStream<'static, Result<Bytes, DomainError>>;

/// Chat-completion service (OpenAI-compatible).
#[async_trait::async_trait]
pub trait CompletionPort: Send + Sync {
    /// Human-readable service name used in logs and error messages.
    fn service_name(&self) -> &str;

    /// Fails with `DomainError::Config` when credentials are missing.
    /// Checked at request time, never cached.
    fn ensure_configured(&self) -> Result<(), DomainError>;

    /// Non-streaming call. Returns `choices[0].message.content`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError>;

    /// Streaming call. Returns the unparsed `text/event-stream` body.
    async fn complete_stream(&self, request: &CompletionRequest)
    -> Result<ByteStream, DomainError>;
}

/// Retrieves a page as plain text.
#[async_trait::async_trait]
pub trait PageFetcherPort: Send + Sync {
    /// Plain text of the page at `url`, truncated to the adapter's limit.
    /// Any failure yields an empty string; callers must cope with that.
    async fn fetch_text(&self, url: &str) -> String;
}
