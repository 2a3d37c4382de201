//! Fixed-response page fetcher for tests and offline runs.

use crate::ports::PageFetcherPort;
use tracing::info;

/// Returns the same text for every URL. `StaticPageFetcher::failing()` models a
/// fetch that timed out (empty text).
pub struct StaticPageFetcher {
    text: String,
}

impl StaticPageFetcher {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn failing() -> Self {
        Self::new("")
    }
}

#[async_trait::async_trait]
impl PageFetcherPort for StaticPageFetcher {
    async fn fetch_text(&self, url: &str) -> String {
        info!(url, text_len = self.text.len(), "[STATIC] serving page text");
        self.text.clone()
    }
}
