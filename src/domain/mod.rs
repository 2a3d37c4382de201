//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod display;
pub mod entities;
pub mod errors;

pub use display::{DisplayBlock, Span};
pub use entities::{
    ChannelPlan, CompletionRequest, ExpectedResults, MetricValue, PredictedMetrics,
    PromptMessage, StrategyFormat, StrategyPlan, StrategyRequest, StrategyResult,
    TotalPredictedResults, WebsiteAnalysis,
};
pub use errors::DomainError;
