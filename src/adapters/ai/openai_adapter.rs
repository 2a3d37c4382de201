//! OpenAI-compatible chat-completion adapter.
//!
//! Works against api.openai.com, the Lovable AI gateway, or any endpoint that
//! speaks the same request/response shape. Implements `CompletionPort` in both
//! plain and streaming modes.

use crate::domain::{CompletionRequest, DomainError, PromptMessage};
use crate::ports::{ByteStream, CompletionPort};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// OpenAI-compatible completion adapter.
///
/// The API key is never stored: `key_var` names the environment variable that
/// is read on every request, so a missing key fails that request only.
pub struct OpenAiAdapter {
    client: reqwest::Client,
    service: String,
    api_url: String,
    key_var: String,
    model: String,
}

impl OpenAiAdapter {
    /// Create a new adapter.
    ///
    /// # Arguments
    /// * `service` - Display name used in logs and errors (e.g. "ChatGPT")
    /// * `api_url` - Chat completions endpoint
    /// * `key_var` - Environment variable holding the bearer token
    /// * `model` - Model name sent with every request
    pub fn new(service: String, api_url: String, key_var: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            service,
            api_url,
            key_var,
            model,
        }
    }

    fn api_key(&self) -> Result<String, DomainError> {
        std::env::var(&self.key_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DomainError::Config("API keys are not configured".to_string()))
    }

    fn wire_request<'a>(&'a self, request: &'a CompletionRequest, stream: bool) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_completion_tokens: request.max_completion_tokens,
            stream: stream.then_some(true),
        }
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, DomainError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&self.wire_request(request, stream))
            .send()
            .await
            .map_err(|e| DomainError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                service = %self.service,
                status = %status,
                body = %text.chars().take(200).collect::<String>(),
                "AI API returned error"
            );
            return Err(DomainError::Upstream {
                service: self.service.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

/// Chat completions request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Chat completions response body (non-streaming).
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait::async_trait]
impl CompletionPort for OpenAiAdapter {
    fn service_name(&self) -> &str {
        &self.service
    }

    fn ensure_configured(&self) -> Result<(), DomainError> {
        self.api_key().map(|_| ())
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        info!(
            service = %self.service,
            model = %self.model,
            prompt_len = request.user_content().len(),
            "sending completion request"
        );

        let response = self.send(request, false).await?;
        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Http(format!("Failed to parse API response: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| DomainError::EmptyCompletion(self.service.clone()))?;

        debug!(service = %self.service, content_len = content.len(), "completion received");
        Ok(content)
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<ByteStream, DomainError> {
        info!(
            service = %self.service,
            model = %self.model,
            prompt_len = request.user_content().len(),
            "opening completion stream"
        );

        let response = self.send(request, true).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| DomainError::Http(e.to_string())))
            .boxed())
    }
}
