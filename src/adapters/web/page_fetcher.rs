//! Fetch a website and reduce it to plain text for the analysis prompt.
//!
//! Failure is silent by contract: timeouts, bad statuses and network errors all
//! produce an empty string and a warning.

use crate::domain::DomainError;
use crate::ports::PageFetcherPort;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{info, warn};

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Prepend `https://` unless the URL already carries an http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Drop scripts, styles and tags, collapse whitespace, keep at most `max_chars` characters.
pub fn strip_html(html: &str, max_chars: usize) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().chars().take(max_chars).collect()
}

/// Page fetcher backed by reqwest with a fixed per-request timeout.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    max_chars: usize,
}

impl HttpPageFetcher {
    /// # Arguments
    /// * `timeout` - Whole-request timeout (connect + body)
    /// * `max_chars` - Truncation limit for the extracted text
    pub fn new(timeout: Duration, max_chars: usize) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| DomainError::Config(format!("page fetcher client: {}", e)))?;
        Ok(Self { client, max_chars })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

#[async_trait::async_trait]
impl PageFetcherPort for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> String {
        let url = normalize_url(url);
        match self.try_fetch(&url).await {
            Ok(html) => {
                let text = strip_html(&html, self.max_chars);
                info!(url = %url, html_len = html.len(), text_len = text.len(), "website content fetched");
                text
            }
            Err(e) => {
                warn!(url = %url, error = %e, "failed to fetch website content; continuing without it");
                String::new()
            }
        }
    }
}
