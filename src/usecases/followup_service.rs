//! Follow-up questions about a delivered strategy.

use crate::domain::{DomainError, StrategyResult};
use crate::ports::CompletionPort;
use crate::usecases::PromptBuilder;
use std::sync::Arc;
use tracing::info;

/// Sends ad hoc questions back through the strategy AI service.
pub struct FollowUpService {
    advisor: Arc<dyn CompletionPort>,
    prompts: PromptBuilder,
}

impl FollowUpService {
    pub fn new(advisor: Arc<dyn CompletionPort>, prompts: PromptBuilder) -> Self {
        Self { advisor, prompts }
    }

    /// Answer `question` about `strategy` (any JSON the caller holds).
    pub async fn answer(
        &self,
        question: &str,
        strategy: &serde_json::Value,
    ) -> Result<String, DomainError> {
        if question.trim().is_empty() {
            return Err(DomainError::Validation("Please enter a question".into()));
        }
        self.advisor.ensure_configured()?;

        let strategy_json = serde_json::to_string_pretty(strategy)
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        let prompt = self.prompts.follow_up(question, &strategy_json);

        info!(
            service = %self.advisor.service_name(),
            question_len = question.len(),
            "answering follow-up question"
        );
        let answer = self.advisor.complete(&prompt).await?;
        Ok(answer.trim().to_string())
    }

    /// Convenience for callers holding a parsed strategy.
    pub async fn answer_about(
        &self,
        question: &str,
        strategy: &StrategyResult,
    ) -> Result<String, DomainError> {
        let value = serde_json::to_value(strategy).map_err(|e| DomainError::Parse(e.to_string()))?;
        self.answer(question, &value).await
    }
}
