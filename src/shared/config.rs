//! Application configuration. Endpoints, models, limits.
//!
//! API keys are deliberately absent: adapters read them from the environment
//! variable named here on every request.

use crate::domain::StrategyFormat;
use serde::Deserialize;

/// Default page-fetch timeout in milliseconds.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5000;

/// Default maximum characters of page text passed to the analysis prompt.
pub const DEFAULT_PAGE_CHAR_LIMIT: usize = 3000;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Listen address for the HTTP API. Read from STRATEGIST_BIND_ADDR.
    #[serde(default)]
    pub bind_addr: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Analysis step (plain completion)
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub analysis_api_url: Option<String>,

    #[serde(default)]
    pub analysis_model: Option<String>,

    /// Name of the env var holding the analysis API key (default OPENAI_API_KEY).
    #[serde(default)]
    pub analysis_key_var: Option<String>,

    #[serde(default)]
    pub analysis_max_tokens: Option<u32>,

    // ─────────────────────────────────────────────────────────────────────────
    // Strategy step (streaming completion) and follow-ups
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub strategy_api_url: Option<String>,

    #[serde(default)]
    pub strategy_model: Option<String>,

    /// Name of the env var holding the strategy API key (default LOVABLE_API_KEY).
    #[serde(default)]
    pub strategy_key_var: Option<String>,

    #[serde(default)]
    pub strategy_temperature: Option<f32>,

    /// `structured` (JSON plan) or `content` (markdown in a JSON envelope).
    #[serde(default)]
    pub strategy_format: Option<StrategyFormat>,

    // ─────────────────────────────────────────────────────────────────────────
    // Page fetching
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,

    #[serde(default)]
    pub page_char_limit: Option<usize>,

    /// Use the offline mock AI adapter. Read from STRATEGIST_MOCK_AI.
    #[serde(default)]
    pub mock_ai: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("STRATEGIST").try_parsing(true));
        if let Ok(path) = std::env::var("STRATEGIST_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn bind_addr_or_default(&self) -> String {
        self.bind_addr
            .clone()
            .unwrap_or_else(|| "127.0.0.1:8787".to_string())
    }

    pub fn analysis_api_url_or_default(&self) -> String {
        self.analysis_api_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string())
    }

    pub fn analysis_model_or_default(&self) -> String {
        self.analysis_model
            .clone()
            .unwrap_or_else(|| "gpt-5-mini-2025-08-07".to_string())
    }

    pub fn analysis_key_var_or_default(&self) -> String {
        self.analysis_key_var
            .clone()
            .unwrap_or_else(|| "OPENAI_API_KEY".to_string())
    }

    pub fn analysis_max_tokens_or_default(&self) -> u32 {
        self.analysis_max_tokens.unwrap_or(1000)
    }

    pub fn strategy_api_url_or_default(&self) -> String {
        self.strategy_api_url
            .clone()
            .unwrap_or_else(|| "https://ai.gateway.lovable.dev/v1/chat/completions".to_string())
    }

    pub fn strategy_model_or_default(&self) -> String {
        self.strategy_model
            .clone()
            .unwrap_or_else(|| "google/gemini-2.5-flash".to_string())
    }

    pub fn strategy_key_var_or_default(&self) -> String {
        self.strategy_key_var
            .clone()
            .unwrap_or_else(|| "LOVABLE_API_KEY".to_string())
    }

    pub fn strategy_temperature_or_default(&self) -> f32 {
        self.strategy_temperature.unwrap_or(0.7)
    }

    pub fn strategy_format_or_default(&self) -> StrategyFormat {
        self.strategy_format.unwrap_or_default()
    }

    pub fn fetch_timeout_ms_or_default(&self) -> u64 {
        self.fetch_timeout_ms.unwrap_or(DEFAULT_FETCH_TIMEOUT_MS)
    }

    pub fn page_char_limit_or_default(&self) -> usize {
        self.page_char_limit.unwrap_or(DEFAULT_PAGE_CHAR_LIMIT)
    }

    /// Mock mode when asked for explicitly.
    pub fn is_mock_ai(&self) -> bool {
        self.mock_ai.unwrap_or(false)
    }

    /// True if both API keys are present in the environment right now.
    pub fn are_keys_present(&self) -> bool {
        [self.analysis_key_var_or_default(), self.strategy_key_var_or_default()]
            .iter()
            .all(|var| std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.bind_addr_or_default(), "127.0.0.1:8787");
        assert_eq!(cfg.fetch_timeout_ms_or_default(), 5000);
        assert_eq!(cfg.page_char_limit_or_default(), 3000);
        assert_eq!(cfg.strategy_format_or_default(), StrategyFormat::Structured);
        assert_eq!(cfg.analysis_key_var_or_default(), "OPENAI_API_KEY");
        assert!(!cfg.is_mock_ai());
    }

    #[test]
    fn deserializes_from_config_source() {
        let cfg: AppConfig = config::Config::builder()
            .set_override("strategy_format", "content")
            .unwrap()
            .set_override("page_char_limit", 2000_i64)
            .unwrap()
            .set_override("mock_ai", true)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.strategy_format_or_default(), StrategyFormat::Content);
        assert_eq!(cfg.page_char_limit_or_default(), 2000);
        assert!(cfg.is_mock_ai());
    }
}
