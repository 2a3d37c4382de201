//! Prompt templates for the analysis, strategy and follow-up calls.

use crate::domain::{CompletionRequest, StrategyFormat, StrategyRequest, WebsiteAnalysis};

const ANALYST_SYSTEM: &str =
    "You are a business analyst specializing in understanding websites and marketing goals.";

const STRATEGIST_STRUCTURED_SYSTEM: &str = "You are a marketing strategist. Based on the website analysis provided, create a comprehensive JSON marketing strategy with: websiteAnalysis (STRING - use the provided analysis), strategicApproach (STRING), channels array with each channel having: name (STRING), allocation (NUMBER), percentage (NUMBER), strategy (STRING), predictedMetrics object with ALL fields: dailyBudget (NUMBER), averageCPC (NUMBER), clicks (NUMBER), conversionRate (NUMBER), conversions (NUMBER), costPerAcquisition (NUMBER). Also include totalPredictedResults with: totalClicks (NUMBER), totalConversions (NUMBER), blendedCPA (NUMBER), summary (STRING). The channel allocations must add up to the full budget. IMPORTANT: All numeric fields must have actual numbers, never null or undefined. Respond with the JSON object only.";

const STRATEGIST_CONTENT_SYSTEM: &str = "You are a marketing strategist. Based on the website analysis provided, write a complete marketing playbook and return it as a JSON object with a single field: content (STRING). The content is markdown using only: headings (#, ##, ###), paragraphs, bullet lists starting with \"- \", tables with a header row and a |---| separator row, **bold** spans and --- horizontal rules. Cover: a website & goal analysis, a budget allocation table (platform, budget, percentage) that adds up to the full budget, a predicted metrics table (clicks, average CPC, conversion rate, conversions, cost per acquisition, ranges allowed), one section per channel with targeting and ad creative, and total predicted results. Respond with the JSON object only.";

const ADVISOR_SYSTEM: &str = "You are a marketing strategist answering follow-up questions about a strategy you already delivered. Answer concisely and concretely, referring to the channels, budget and metrics in the strategy.";

/// Builds completion requests. Holds the per-call tuning that comes from config.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    format: StrategyFormat,
    analysis_max_tokens: u32,
    strategy_temperature: f32,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(StrategyFormat::default(), 1000, 0.7)
    }
}

impl PromptBuilder {
    pub fn new(format: StrategyFormat, analysis_max_tokens: u32, strategy_temperature: f32) -> Self {
        Self {
            format,
            analysis_max_tokens,
            strategy_temperature,
        }
    }

    pub fn format(&self) -> StrategyFormat {
        self.format
    }

    /// Step one. With page text the model analyses the content; without it the
    /// model infers the business from URL and goal alone.
    pub fn analysis(&self, req: &StrategyRequest, page_content: &str) -> CompletionRequest {
        let user = if page_content.trim().is_empty() {
            format!(
                "Analyze this marketing scenario. Website URL: {}, Marketing Goal: {}, Budget: ${}/month. \
                 Based on the URL and goal, provide analysis of likely business type, target audience, and marketing approach.",
                req.website_url,
                req.goal,
                format_budget(req.budget)
            )
        } else {
            format!(
                "Analyze this website and marketing goal. Website URL: {}, Content: {}. Marketing Goal: {}. Budget: ${}/month. \
                 Provide a detailed analysis of: 1) What the business does and its value proposition, 2) Target audience, \
                 3) Key selling points, 4) How this relates to the marketing goal. Be concise but thorough.",
                req.website_url,
                page_content,
                req.goal,
                format_budget(req.budget)
            )
        };

        let mut request = CompletionRequest::new(ANALYST_SYSTEM, user);
        request.max_completion_tokens = Some(self.analysis_max_tokens);
        request
    }

    /// Step two. Only buildable from a finished analysis.
    pub fn strategy(&self, analysis: &WebsiteAnalysis) -> CompletionRequest {
        let req = analysis.request();
        let system = match self.format {
            StrategyFormat::Structured => STRATEGIST_STRUCTURED_SYSTEM,
            StrategyFormat::Content => STRATEGIST_CONTENT_SYSTEM,
        };
        let user = format!(
            "Website & Goal Analysis from our analyst:\n{}\n\nWebsite: {}\nBudget: ${}/month\nMarketing Goal: {}\n\n\
             Based on this analysis, create a detailed marketing strategy with budget allocation and predicted metrics.",
            analysis.text(),
            req.website_url,
            format_budget(req.budget),
            req.goal
        );

        let mut request = CompletionRequest::new(system, user);
        request.temperature = Some(self.strategy_temperature);
        request
    }

    /// Ad hoc question about an existing strategy (serialized as JSON).
    pub fn follow_up(&self, question: &str, strategy_json: &str) -> CompletionRequest {
        let user = format!(
            "Here is the marketing strategy:\n{}\n\nQuestion: {}",
            strategy_json,
            question.trim()
        );
        let mut request = CompletionRequest::new(ADVISOR_SYSTEM, user);
        request.temperature = Some(self.strategy_temperature);
        request
    }
}

/// Whole amounts without decimals, otherwise two decimals.
fn format_budget(budget: f64) -> String {
    if budget.fract() == 0.0 {
        format!("{}", budget as i64)
    } else {
        format!("{:.2}", budget)
    }
}
