//! Application use cases. Orchestrate domain logic via ports.

pub mod followup_service;
pub mod prompt_builder;
pub mod render;
pub mod strategy_service;

pub use followup_service::FollowUpService;
pub use prompt_builder::PromptBuilder;
pub use render::{render_content, render_strategy, split_bold_spans};
pub use strategy_service::StrategyService;
