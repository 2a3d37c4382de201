//! Strategy service. Orchestrates the two-step AI pipeline.
//!
//! Step one (analysis) characterizes the business from page text; step two
//! (strategy) turns that analysis into a budget plan. Step two takes a
//! `WebsiteAnalysis`, which only step one produces.

use crate::adapters::ai::{decode_stream, parse_strategy_payload};
use crate::domain::{DomainError, StrategyRequest, StrategyResult, WebsiteAnalysis};
use crate::ports::{ByteStream, CompletionPort, PageFetcherPort};
use crate::usecases::PromptBuilder;
use std::sync::Arc;
use tracing::{info, warn};

/// Allocation drift above which a plan is logged as not matching the budget.
const ALLOCATION_DRIFT_WARN: f64 = 0.05;

/// Orchestrates page fetch, analysis and strategy generation.
///
/// Holds no per-request state; every call owns its own request/response cycle.
/// No retries anywhere: the first failure is returned to the caller.
pub struct StrategyService {
    analyst: Arc<dyn CompletionPort>,
    strategist: Arc<dyn CompletionPort>,
    fetcher: Arc<dyn PageFetcherPort>,
    prompts: PromptBuilder,
}

impl StrategyService {
    /// # Arguments
    /// * `analyst` - Service for step one (plain completion)
    /// * `strategist` - Service for step two (streaming completion)
    /// * `fetcher` - Page fetcher; failures degrade to an empty page
    /// * `prompts` - Prompt templates and per-call tuning
    pub fn new(
        analyst: Arc<dyn CompletionPort>,
        strategist: Arc<dyn CompletionPort>,
        fetcher: Arc<dyn PageFetcherPort>,
        prompts: PromptBuilder,
    ) -> Self {
        Self {
            analyst,
            strategist,
            fetcher,
            prompts,
        }
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    /// Both services must be configured before any network call is made.
    pub fn ensure_configured(&self) -> Result<(), DomainError> {
        self.analyst.ensure_configured()?;
        self.strategist.ensure_configured()
    }

    /// Step one: fetch the page (best effort) and ask the analyst about it.
    pub async fn analyze(&self, request: &StrategyRequest) -> Result<WebsiteAnalysis, DomainError> {
        request.validate()?;
        self.ensure_configured()?;

        info!(
            url = %request.website_url,
            budget = request.budget,
            goal = %request.goal,
            "analyzing website"
        );

        let page_content = self.fetcher.fetch_text(&request.website_url).await;
        if page_content.is_empty() {
            warn!(url = %request.website_url, "no page content; analysis will infer from URL and goal");
        }

        let prompt = self.prompts.analysis(request, &page_content);
        let text = self.analyst.complete(&prompt).await?;
        info!(
            service = %self.analyst.service_name(),
            analysis_len = text.len(),
            "analysis step complete"
        );

        Ok(WebsiteAnalysis::new(
            request.clone(),
            page_content.chars().count(),
            text,
        ))
    }

    /// Step two, streaming: the raw event stream from the strategist.
    pub async fn stream_strategy(&self, analysis: &WebsiteAnalysis) -> Result<ByteStream, DomainError> {
        let prompt = self.prompts.strategy(analysis);
        info!(
            service = %self.strategist.service_name(),
            format = ?self.prompts.format(),
            "strategy step started"
        );
        self.strategist.complete_stream(&prompt).await
    }

    /// Both steps, returning the strategist's event stream unparsed (for proxying).
    pub async fn stream(&self, request: &StrategyRequest) -> Result<ByteStream, DomainError> {
        let analysis = self.analyze(request).await?;
        self.stream_strategy(&analysis).await
    }

    /// Both steps, decoded and parsed. `on_delta` sees streamed text as it arrives.
    pub async fn generate<F>(
        &self,
        request: &StrategyRequest,
        on_delta: F,
    ) -> Result<StrategyResult, DomainError>
    where
        F: FnMut(&str),
    {
        let analysis = self.analyze(request).await?;
        let stream = self.stream_strategy(&analysis).await?;
        let text = decode_stream(stream, on_delta).await?;
        info!(text_len = text.len(), "strategy stream finished");

        let result = parse_strategy_payload(&text)?;
        if let StrategyResult::Structured(plan) = &result {
            let drift = plan.allocation_drift(request.budget);
            if drift > ALLOCATION_DRIFT_WARN {
                warn!(
                    budget = request.budget,
                    allocated = plan.allocated_total(),
                    "channel allocations do not add up to the budget"
                );
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockCompletionAdapter, encode_event_stream};
    use crate::adapters::web::StaticPageFetcher;
    use crate::domain::StrategyFormat;

    fn request() -> StrategyRequest {
        StrategyRequest::new("outrank.so", 250.0, "Get more traffic").unwrap()
    }

    fn service(
        analyst: Arc<MockCompletionAdapter>,
        strategist: Arc<MockCompletionAdapter>,
        page: StaticPageFetcher,
    ) -> StrategyService {
        StrategyService::new(
            analyst,
            strategist,
            Arc::new(page),
            PromptBuilder::new(StrategyFormat::Structured, 1000, 0.7),
        )
    }

    const PLAN_JSON: &str = r#"{"websiteAnalysis":"SEO SaaS","strategicApproach":"Intent first",
        "channels":[{"name":"Google","allocation":175,"percentage":70,"strategy":"Search"},
                    {"name":"X","allocation":75,"percentage":30,"strategy":"Lookalikes"}],
        "totalPredictedResults":{"totalClicks":150,"totalConversions":6,"blendedCPA":41,"summary":"ok"}}"#;

    #[tokio::test]
    async fn analysis_feeds_strategy_prompt() {
        let analyst = Arc::new(MockCompletionAdapter::with_text("B2B SEO platform"));
        let strategist = Arc::new(MockCompletionAdapter::with_text(format!(
            "```json\n{}\n```",
            PLAN_JSON
        )));
        let svc = service(
            analyst.clone(),
            strategist.clone(),
            StaticPageFetcher::new("Automate your SEO"),
        );

        let mut streamed = String::new();
        let result = svc
            .generate(&request(), |d| streamed.push_str(d))
            .await
            .unwrap();

        let StrategyResult::Structured(plan) = result else {
            panic!("expected structured plan");
        };
        assert_eq!(plan.channels.len(), 2);
        assert!(streamed.contains("\"channels\""));

        let analysis_prompt = &analyst.requests()[0];
        assert!(analysis_prompt.user_content().contains("Content: Automate your SEO"));
        let strategy_prompt = &strategist.requests()[0];
        assert!(strategy_prompt.user_content().contains("B2B SEO platform"));
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_inference_prompt() {
        let analyst = Arc::new(MockCompletionAdapter::with_text("guessing"));
        let strategist = Arc::new(MockCompletionAdapter::with_text(PLAN_JSON));
        let svc = service(analyst.clone(), strategist, StaticPageFetcher::failing());

        let analysis = svc.analyze(&request()).await.unwrap();
        assert_eq!(analysis.page_content_len(), 0);
        assert_eq!(analysis.text(), "guessing");
        let prompt = &analyst.requests()[0];
        assert!(prompt.user_content().starts_with("Analyze this marketing scenario."));
    }

    #[tokio::test]
    async fn missing_keys_fail_before_any_call() {
        let analyst = Arc::new(MockCompletionAdapter::with_text("x"));
        let strategist = Arc::new(MockCompletionAdapter::unconfigured());
        let svc = service(analyst.clone(), strategist, StaticPageFetcher::new("page"));

        let err = svc.generate(&request(), |_| {}).await.unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
        assert!(analyst.requests().is_empty());
    }

    #[tokio::test]
    async fn upstream_errors_propagate_without_retry() {
        let analyst = Arc::new(MockCompletionAdapter::failing(500).named("ChatGPT"));
        let strategist = Arc::new(MockCompletionAdapter::with_text(PLAN_JSON));
        let svc = service(analyst.clone(), strategist.clone(), StaticPageFetcher::new("p"));

        let err = svc.stream(&request()).await.err().unwrap();
        assert_eq!(err.to_string(), "ChatGPT API request failed: 500");
        assert_eq!(analyst.requests().len(), 1);
        assert!(strategist.requests().is_empty());
    }

    #[tokio::test]
    async fn empty_analysis_choices_is_an_error() {
        let svc = service(
            Arc::new(MockCompletionAdapter::empty()),
            Arc::new(MockCompletionAdapter::with_text(PLAN_JSON)),
            StaticPageFetcher::new("p"),
        );
        assert!(matches!(
            svc.analyze(&request()).await,
            Err(DomainError::EmptyCompletion(_))
        ));
    }

    #[tokio::test]
    async fn malformed_strategy_json_is_fatal() {
        let svc = service(
            Arc::new(MockCompletionAdapter::with_text("analysis")),
            Arc::new(MockCompletionAdapter::with_text("```json\n{\"channels\": [\n```")),
            StaticPageFetcher::new("p"),
        );
        assert!(matches!(
            svc.generate(&request(), |_| {}).await,
            Err(DomainError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn invalid_request_is_rejected() {
        let svc = service(
            Arc::new(MockCompletionAdapter::with_text("a")),
            Arc::new(MockCompletionAdapter::with_text("b")),
            StaticPageFetcher::new("p"),
        );
        let bad = StrategyRequest {
            website_url: "site.io".into(),
            budget: -5.0,
            goal: "x".into(),
        };
        assert!(matches!(
            svc.analyze(&bad).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn stream_is_proxied_unchanged() {
        let svc = service(
            Arc::new(MockCompletionAdapter::with_text("a")),
            Arc::new(MockCompletionAdapter::with_text("{\"content\":\"# Hi\"}")),
            StaticPageFetcher::new("p"),
        );
        let stream = svc.stream(&request()).await.unwrap();
        let chunks: Vec<_> = futures::StreamExt::collect::<Vec<_>>(stream).await;
        let body: Vec<u8> = chunks
            .into_iter()
            .flat_map(|c| c.unwrap().to_vec())
            .collect();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            encode_event_stream("{\"content\":\"# Hi\"}")
        );
    }
}
