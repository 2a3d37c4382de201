//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/IO types here. Everything lives for one analysis request/response cycle.

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User submission: the site to analyze, the monthly budget and the marketing goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRequest {
    pub website_url: String,
    pub budget: f64,
    pub goal: String,
}

impl StrategyRequest {
    pub fn new(
        website_url: impl Into<String>,
        budget: f64,
        goal: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let req = Self {
            website_url: website_url.into(),
            budget,
            goal: goal.into(),
        };
        req.validate()?;
        Ok(req)
    }

    /// URL and goal must be non-empty, budget a positive finite number.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.website_url.trim().is_empty() {
            return Err(DomainError::Validation("websiteUrl is required".into()));
        }
        if self.goal.trim().is_empty() {
            return Err(DomainError::Validation("goal is required".into()));
        }
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(DomainError::Validation(
                "budget must be a positive number".into(),
            ));
        }
        Ok(())
    }
}

/// Which payload shape the strategy step asks the AI service for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyFormat {
    /// Flat JSON object with channels, metrics and totals.
    #[default]
    Structured,
    /// `{ "content": "<markdown>" }`.
    Content,
}

/// A metric the model may give either as a number or as a human-readable range ("25 - 44").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            MetricValue::Number(n) => write!(f, "{:.2}", n),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<MetricValue>,
    #[serde(
        default,
        rename = "averageCPC",
        skip_serializing_if = "Option::is_none"
    )]
    pub average_cpc: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversions: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_acquisition: Option<MetricValue>,
}

impl PredictedMetrics {
    /// Label/value pairs for the metrics that are present, in display order.
    pub fn entries(&self) -> Vec<(&'static str, &MetricValue)> {
        [
            ("Daily budget", &self.daily_budget),
            ("Average CPC", &self.average_cpc),
            ("Clicks", &self.clicks),
            ("Conversion rate", &self.conversion_rate),
            ("Conversions", &self.conversions),
            ("Cost per acquisition", &self.cost_per_acquisition),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| (label, v)))
        .collect()
    }
}

/// Budget share and plan for one advertising platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPlan {
    pub name: String,
    #[serde(default)]
    pub allocation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_metrics: Option<PredictedMetrics>,
    /// Earlier dashboard shape: rationale text instead of `strategy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(
        default,
        rename = "expectedROAS",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_roas: Option<f64>,
}

impl ChannelPlan {
    /// Narrative text, whichever field the model filled.
    pub fn narrative(&self) -> Option<&str> {
        self.strategy.as_deref().or(self.reasoning.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalPredictedResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_clicks: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_conversions: Option<MetricValue>,
    #[serde(
        default,
        rename = "blendedCPA",
        skip_serializing_if = "Option::is_none"
    )]
    pub blended_cpa: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projected_revenue: Option<f64>,
    #[serde(
        default,
        rename = "projectedROAS",
        skip_serializing_if = "Option::is_none"
    )]
    pub projected_roas: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

/// Flat strategy object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategic_approach: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_strategy: Option<String>,
    #[serde(default)]
    pub channels: Vec<ChannelPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_predicted_results: Option<TotalPredictedResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_results: Option<ExpectedResults>,
}

impl StrategyPlan {
    pub fn allocated_total(&self) -> f64 {
        self.channels.iter().map(|c| c.allocation).sum()
    }

    /// Relative gap between allocated spend and the budget (0.0 = exact).
    /// The model is asked to allocate the whole budget; nothing enforces it.
    pub fn allocation_drift(&self, budget: f64) -> f64 {
        if budget <= 0.0 {
            return 0.0;
        }
        ((self.allocated_total() - budget) / budget).abs()
    }
}

/// Final strategy, either shape. The discriminator is resolved once, in [`StrategyResult::from_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum StrategyResult {
    Structured(StrategyPlan),
    Content { content: String },
}

impl StrategyResult {
    /// Parse an AI payload. An object with a string `content` field is the
    /// pre-rendered markdown shape; anything else must be a [`StrategyPlan`].
    pub fn from_json(payload: &str) -> Result<Self, DomainError> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| DomainError::Parse(e.to_string()))?;

        if let Some(content) = value.get("content").and_then(|c| c.as_str()) {
            return Ok(StrategyResult::Content {
                content: content.to_string(),
            });
        }
        if !value.is_object() {
            return Err(DomainError::Parse("expected a JSON object".to_string()));
        }

        serde_json::from_value::<StrategyPlan>(value)
            .map(StrategyResult::Structured)
            .map_err(|e| DomainError::Parse(e.to_string()))
    }

    pub fn format(&self) -> StrategyFormat {
        match self {
            StrategyResult::Structured(_) => StrategyFormat::Structured,
            StrategyResult::Content { .. } => StrategyFormat::Content,
        }
    }
}

/// Chat message sent to a completion service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Model-agnostic completion request. The adapter adds model name and stream flag.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub temperature: Option<f32>,
    pub max_completion_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![PromptMessage::system(system), PromptMessage::user(user)],
            temperature: None,
            max_completion_tokens: None,
        }
    }

    pub fn user_content(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

/// Output of the analysis step. Only the analysis step constructs it, so the
/// strategy step cannot run without one.
#[derive(Debug, Clone, PartialEq)]
pub struct WebsiteAnalysis {
    request: StrategyRequest,
    page_content_len: usize,
    text: String,
}

impl WebsiteAnalysis {
    pub(crate) fn new(request: StrategyRequest, page_content_len: usize, text: String) -> Self {
        Self {
            request,
            page_content_len,
            text,
        }
    }

    pub fn request(&self) -> &StrategyRequest {
        &self.request
    }

    /// Characters of fetched page text the analysis was based on (0 = inferred from URL).
    pub fn page_content_len(&self) -> usize {
        self.page_content_len
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_validation() {
        assert!(StrategyRequest::new("example.com", 250.0, "more traffic").is_ok());
        assert!(matches!(
            StrategyRequest::new("  ", 250.0, "more traffic"),
            Err(DomainError::Validation(_))
        ));
        assert!(StrategyRequest::new("example.com", 0.0, "goal").is_err());
        assert!(StrategyRequest::new("example.com", f64::NAN, "goal").is_err());
        assert!(StrategyRequest::new("example.com", 10.0, "").is_err());
    }

    #[test]
    fn request_uses_camel_case_wire_names() {
        let req: StrategyRequest = serde_json::from_str(
            r#"{"websiteUrl":"example.com","budget":500,"goal":"Sign-ups"}"#,
        )
        .unwrap();
        assert_eq!(req.website_url, "example.com");
        assert_eq!(req.budget, 500.0);
    }

    #[test]
    fn parses_structured_plan_with_mixed_metrics() {
        let payload = r#"{
            "websiteAnalysis": "SaaS for SEO",
            "strategicApproach": "High intent first",
            "channels": [
                {"name": "Google Search", "allocation": 175, "percentage": 70,
                 "strategy": "Long-tail keywords",
                 "predictedMetrics": {"dailyBudget": 12.5, "averageCPC": "$4.00 - $7.00",
                                      "clicks": "25 - 44", "conversionRate": 7,
                                      "conversions": 3, "costPerAcquisition": 58}},
                {"name": "X Ads", "allocation": 75, "percentage": 30, "strategy": "Lookalikes"}
            ],
            "totalPredictedResults": {"totalClicks": 150, "totalConversions": 6,
                                      "blendedCPA": 41.6, "summary": "Focused test"}
        }"#;

        let StrategyResult::Structured(plan) = StrategyResult::from_json(payload).unwrap() else {
            panic!("expected structured plan");
        };
        assert_eq!(plan.channels.len(), 2);
        let metrics = plan.channels[0].predicted_metrics.as_ref().unwrap();
        assert_eq!(metrics.daily_budget, Some(MetricValue::Number(12.5)));
        assert_eq!(
            metrics.average_cpc,
            Some(MetricValue::Text("$4.00 - $7.00".into()))
        );
        assert_eq!(metrics.entries().len(), 6);
        assert_eq!(plan.allocated_total(), 250.0);
        assert_eq!(plan.allocation_drift(250.0), 0.0);
    }

    #[test]
    fn parses_legacy_channel_fields() {
        let payload = r#"{"overallStrategy": "Go social",
            "channels": [{"name": "Meta", "allocation": 60, "expectedROAS": 3.2, "reasoning": "Visual product"}],
            "expectedResults": {"projectedRevenue": 12000, "projectedROAS": 3.1, "timeframe": "90 days"}}"#;
        let StrategyResult::Structured(plan) = StrategyResult::from_json(payload).unwrap() else {
            panic!("expected structured plan");
        };
        assert_eq!(plan.channels[0].narrative(), Some("Visual product"));
        assert_eq!(plan.channels[0].expected_roas, Some(3.2));
        assert_eq!(
            plan.expected_results.unwrap().timeframe.as_deref(),
            Some("90 days")
        );
    }

    #[test]
    fn content_payload_resolves_to_content_variant() {
        let result = StrategyResult::from_json(r##"{"content": "# Title"}"##).unwrap();
        assert_eq!(result.format(), StrategyFormat::Content);
        assert_eq!(
            result,
            StrategyResult::Content {
                content: "# Title".into()
            }
        );
    }

    #[test]
    fn malformed_payload_is_parse_error() {
        assert!(matches!(
            StrategyResult::from_json("{not json"),
            Err(DomainError::Parse(_))
        ));
        assert!(matches!(
            StrategyResult::from_json("[1, 2]"),
            Err(DomainError::Parse(_))
        ));
    }

    #[test]
    fn result_serializes_with_discriminator() {
        let json = serde_json::to_value(StrategyResult::Content {
            content: "x".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"format": "content", "content": "x"}));
    }

    #[test]
    fn metric_display() {
        assert_eq!(MetricValue::Number(44.0).to_string(), "44");
        assert_eq!(MetricValue::Number(4.5678).to_string(), "4.57");
        assert_eq!(MetricValue::Text("~7%".into()).to_string(), "~7%");
    }
}
