//! Mock completion adapter for testing and offline demos.
//!
//! Returns canned responses without making API calls. Streaming replies are
//! encoded as a real event stream and cut into small chunks, including cuts
//! inside multi-byte characters.

use crate::domain::{CompletionRequest, DomainError};
use crate::ports::{ByteStream, CompletionPort};
use bytes::Bytes;
use futures::{StreamExt, stream};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

/// Bytes per transport chunk in mock streams.
const MOCK_CHUNK_BYTES: usize = 48;

/// Sample strategy in the content format, used by the offline demo.
pub const DEMO_STRATEGY: &str = r#"# Website & Goal Analysis

The site sells an AI tool that automates SEO content: it researches keywords, writes articles and publishes them on a schedule. With a small budget, the best return comes from reaching people who are already looking for a solution, so spend is concentrated on the two highest-intent channels.

## Budget Allocation

| Platform | Budget | Percentage |
|----------|--------|------------|
| Google Search Ads | $175.00 | 70% |
| X (Twitter) Ads | $75.00 | 30% |

## Predicted Metrics

| Metric | Google Ads | X Ads | Total |
|--------|-----------|-------|-------|
| Predicted Clicks | 25 - 44 | 90 - 150 | 115 - 194 |
| Avg. CPC | $4.00 - $7.00 | $0.50 - $0.80 | $1.29 - $2.17 |
| Conversion Rate | ~7.0% | ~3.0% | ~4.1% |
| Trial Sign-ups | 2 - 3 | 3 - 5 | 5 - 8 |

---

## 1. Google Search Ads ($175)

**Campaign Goal:** Free trial sign-ups from active searchers.

- **Keywords:** "automated seo content", "ai blog writer", "seo automation tool"
- **Negative keywords:** "free", "jobs", "course"
- **Budget:** ~$12 per day over a 14-day test

## 2. X (Twitter) Ads ($75)

**Campaign Goal:** Website traffic from marketers and founders.

- **Follower look-alikes:** audiences similar to major SEO accounts
- **Creative:** a short screen recording of the product dashboard

---

## Total Predicted Results

- **Total Website Clicks:** 115 - 194
- **Total Trial Sign-ups:** 5 - 8
- **Blended CPA:** $31 - $50

This focused test finds the most profitable channel before scaling spend."#;

const DEMO_ANALYSIS: &str = "The business offers an AI-driven SEO content platform for small \
teams and founders. Its audience is marketers who want organic traffic without writing every \
article themselves. Key selling points are automation and daily publishing; both map directly \
to a goal of getting more traffic.";

enum MockReply {
    /// Analysis text for plain calls, `DEMO_STRATEGY` for streams.
    Demo,
    /// Same text for both plain and streaming calls.
    Text(String),
    /// Upstream failure with this HTTP status.
    Status(u16),
    /// Successful response with no choices.
    Empty,
}

/// Mock completion adapter.
///
/// Records every request it receives so tests can assert on prompts.
pub struct MockCompletionAdapter {
    service: String,
    delay_ms: u64,
    reply: MockReply,
    configured: bool,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionAdapter {
    /// Demo adapter with default delay (100ms).
    pub fn new() -> Self {
        Self::build(MockReply::Demo, true).with_delay(100)
    }

    /// Replies with `text` to every call.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::build(MockReply::Text(text.into()), true)
    }

    /// Fails every call with an upstream HTTP error.
    pub fn failing(status: u16) -> Self {
        Self::build(MockReply::Status(status), true)
    }

    /// Returns no choices.
    pub fn empty() -> Self {
        Self::build(MockReply::Empty, true)
    }

    /// Behaves as if its API key were missing.
    pub fn unconfigured() -> Self {
        Self::build(MockReply::Demo, false)
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn named(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn build(reply: MockReply, configured: bool) -> Self {
        Self {
            service: "Mock".to_string(),
            delay_ms: 0,
            reply,
            configured,
            requests: Mutex::new(Vec::new()),
        }
    }

    async fn record(&self, request: &CompletionRequest) -> Result<(), DomainError> {
        self.ensure_configured()?;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        Ok(())
    }

    fn upstream_error(&self, status: u16) -> DomainError {
        DomainError::Upstream {
            service: self.service.clone(),
            status,
        }
    }
}

impl Default for MockCompletionAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode `text` as an OpenAI-style event stream terminated by `[DONE]`.
pub fn encode_event_stream(text: &str) -> String {
    let mut out = String::from(": mock stream\n\n");
    let chars: Vec<char> = text.chars().collect();
    for piece in chars.chunks(24) {
        let content: String = piece.iter().collect();
        let chunk = serde_json::json!({ "choices": [{ "delta": { "content": content } }] });
        out.push_str(&format!("data: {}\n\n", chunk));
    }
    out.push_str("data: [DONE]\n\n");
    out
}

#[async_trait::async_trait]
impl CompletionPort for MockCompletionAdapter {
    fn service_name(&self) -> &str {
        &self.service
    }

    fn ensure_configured(&self) -> Result<(), DomainError> {
        if self.configured {
            Ok(())
        } else {
            Err(DomainError::Config("API keys are not configured".to_string()))
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        info!(
            service = %self.service,
            prompt_len = request.user_content().len(),
            "[MOCK] Simulating completion"
        );
        self.record(request).await?;

        match &self.reply {
            MockReply::Demo => Ok(DEMO_ANALYSIS.to_string()),
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Empty => Err(DomainError::EmptyCompletion(self.service.clone())),
            MockReply::Status(status) => Err(self.upstream_error(*status)),
        }
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<ByteStream, DomainError> {
        info!(
            service = %self.service,
            prompt_len = request.user_content().len(),
            "[MOCK] Simulating completion stream"
        );
        self.record(request).await?;

        let body = match &self.reply {
            MockReply::Demo => {
                let payload = serde_json::json!({ "content": DEMO_STRATEGY });
                encode_event_stream(&format!("```json\n{}\n```", payload))
            }
            MockReply::Text(text) => encode_event_stream(text),
            MockReply::Empty => "data: [DONE]\n\n".to_string(),
            MockReply::Status(status) => return Err(self.upstream_error(*status)),
        };

        let chunks: Vec<Result<Bytes, DomainError>> = body
            .into_bytes()
            .chunks(MOCK_CHUNK_BYTES)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }
}
