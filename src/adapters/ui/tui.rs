//! Implements InputPort. Inquire-based interactive dashboard.
//!
//! Main menu: generate a strategy, ask a follow-up about it, serve the HTTP API, exit.

use crate::adapters::http::{self, ApiState};
use crate::adapters::ui::dashboard::{DashboardSession, draw_blocks};
use crate::adapters::ui::progress;
use crate::domain::{DomainError, StrategyRequest};
use crate::ports::InputPort;
use crate::usecases::{FollowUpService, StrategyService, render_content};
use async_trait::async_trait;
use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use inquire::error::InquireError;
use inquire::ui::{Attributes, Color as PromptColor, RenderConfig, StyleSheet, Styled};
use inquire::validator::Validation;
use inquire::{CustomType, Select, Text};
use std::io::{Write, stdout};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

const MENU_GENERATE: &str = "Generate strategy";
const MENU_FOLLOW_UP: &str = "Ask a follow-up question";
const MENU_SERVE: &str = "Start HTTP API";
const MENU_EXIT: &str = "Exit";

/// Theme for every inquire prompt. Call once before the first prompt.
pub fn apply_theme() {
    let mut config = RenderConfig::default();
    config.prompt_prefix = Styled::new("›").with_fg(PromptColor::LightCyan);
    config.highlighted_option_prefix = Styled::new("➜").with_fg(PromptColor::LightGreen);
    config.answer = StyleSheet::new()
        .with_fg(PromptColor::LightGreen)
        .with_attr(Attributes::BOLD);
    inquire::set_global_render_config(config);
}

/// Ctrl-C / Esc at a prompt means "back out", not failure.
fn is_cancel(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

fn ui_error(err: InquireError) -> DomainError {
    DomainError::Ui(err.to_string())
}

fn notify(color: Color, message: &str) {
    let mut out = stdout();
    let _ = out.execute(SetForegroundColor(color));
    let _ = out.execute(Print(format!("{}\r\n", message)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

/// TUI adapter. Owns the dashboard session for the current submission.
pub struct TuiInputPort {
    strategy: Arc<StrategyService>,
    followup: Arc<FollowUpService>,
    bind_addr: String,
    session: Mutex<DashboardSession>,
}

impl TuiInputPort {
    pub fn new(
        strategy: Arc<StrategyService>,
        followup: Arc<FollowUpService>,
        bind_addr: impl Into<String>,
    ) -> Self {
        Self {
            strategy,
            followup,
            bind_addr: bind_addr.into(),
            session: Mutex::new(DashboardSession::new()),
        }
    }

    /// Prompt for URL, goal, budget. `Ok(None)` when the user backs out.
    fn prompt_request(&self) -> Result<Option<StrategyRequest>, DomainError> {
        let url = Text::new("Website URL:")
            .with_placeholder("example.com")
            .with_validator(|input: &str| {
                Ok(if input.trim().is_empty() {
                    Validation::Invalid("Please enter a website URL".into())
                } else {
                    Validation::Valid
                })
            })
            .prompt();
        let url = match url {
            Ok(url) => url,
            Err(e) if is_cancel(&e) => return Ok(None),
            Err(e) => return Err(ui_error(e)),
        };

        let goal = Text::new("Marketing goal:")
            .with_default("Get more traffic")
            .with_validator(|input: &str| {
                Ok(if input.trim().is_empty() {
                    Validation::Invalid("Please describe a goal".into())
                } else {
                    Validation::Valid
                })
            })
            .prompt();
        let goal = match goal {
            Ok(goal) => goal,
            Err(e) if is_cancel(&e) => return Ok(None),
            Err(e) => return Err(ui_error(e)),
        };

        let budget = CustomType::<f64>::new("Budget (USD):")
            .with_error_message("Please enter a number")
            .with_validator(|value: &f64| {
                Ok(if value.is_finite() && *value > 0.0 {
                    Validation::Valid
                } else {
                    Validation::Invalid("Budget must be greater than zero".into())
                })
            })
            .prompt();
        let budget = match budget {
            Ok(budget) => budget,
            Err(e) if is_cancel(&e) => return Ok(None),
            Err(e) => return Err(ui_error(e)),
        };

        StrategyRequest::new(url.trim(), budget, goal.trim()).map(Some)
    }

    async fn generate(&self) -> Result<(), DomainError> {
        let Some(request) = self.prompt_request()? else {
            return Ok(());
        };
        self.submit(request).await
    }

    /// Run the pipeline for `request` and show the result.
    ///
    /// The session stays locked for the whole run, so submissions never overlap
    /// and a failed run leaves the previous strategy in place.
    async fn submit(&self, request: StrategyRequest) -> Result<(), DomainError> {
        let mut session = self.session.lock().await;

        let spinner = progress::spinner("Analyzing website...");
        let mut received = 0usize;
        let result = self
            .strategy
            .generate(&request, |delta| {
                received += delta.chars().count();
                spinner.set_message(progress::streaming_message(received));
            })
            .await;

        let strategy = match result {
            Ok(strategy) => {
                spinner.finish_and_clear();
                strategy
            }
            Err(e) => {
                spinner.abandon_with_message("Strategy generation failed");
                return Err(e);
            }
        };

        info!(format = ?strategy.format(), "strategy ready");
        session.replace(request, strategy);
        session
            .draw(&mut stdout())
            .map_err(|e| DomainError::Ui(e.to_string()))?;
        notify(Color::Green, "Strategy generated successfully!");
        Ok(())
    }

    async fn follow_up(&self) -> Result<(), DomainError> {
        let session = self.session.lock().await;
        let Some(strategy) = session.strategy() else {
            notify(Color::Yellow, "Generate a strategy first.");
            return Ok(());
        };

        let question = match Text::new("Your question:")
            .with_help_message("e.g. Which channel should get more budget next month?")
            .prompt()
        {
            Ok(q) => q,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(ui_error(e)),
        };

        let spinner = progress::spinner("Thinking...");
        let answer = self.followup.answer_about(&question, strategy).await;
        spinner.finish_and_clear();
        let answer = answer?;

        draw_blocks(&mut stdout(), &render_content(&answer))
            .and_then(|_| stdout().flush())
            .map_err(|e| DomainError::Ui(e.to_string()))
    }

    async fn serve_api(&self) -> Result<(), DomainError> {
        notify(
            Color::Cyan,
            &format!(
                "Serving on http://{} (Ctrl-C to return to the menu)",
                self.bind_addr
            ),
        );
        let state = ApiState {
            strategy: Arc::clone(&self.strategy),
            followup: Arc::clone(&self.followup),
        };
        http::serve(&self.bind_addr, state).await
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let options = vec![MENU_GENERATE, MENU_FOLLOW_UP, MENU_SERVE, MENU_EXIT];
            let choice = match Select::new("What would you like to do?", options).prompt() {
                Ok(choice) => choice,
                Err(e) if is_cancel(&e) => break,
                Err(e) => return Err(ui_error(e)),
            };

            let outcome = match choice {
                MENU_GENERATE => self.generate().await,
                MENU_FOLLOW_UP => self.follow_up().await,
                MENU_SERVE => self.serve_api().await,
                _ => break,
            };

            // Request errors are shown and the menu continues; prompt failures end the session.
            match outcome {
                Ok(()) => {}
                Err(DomainError::Ui(msg)) => return Err(DomainError::Ui(msg)),
                Err(e) => {
                    warn!(error = %e, "request failed");
                    notify(Color::Red, &format!("Error: {}", e));
                }
            }
        }
        info!("Goodbye");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockCompletionAdapter;
    use crate::adapters::web::StaticPageFetcher;
    use crate::domain::{StrategyFormat, StrategyResult};
    use crate::usecases::PromptBuilder;
    use std::time::Duration;

    fn port(analyst: Arc<MockCompletionAdapter>) -> TuiInputPort {
        let strategist = Arc::new(MockCompletionAdapter::new().with_delay(0));
        let prompts = PromptBuilder::new(StrategyFormat::Content, 1000, 0.7);
        TuiInputPort::new(
            Arc::new(StrategyService::new(
                analyst,
                strategist.clone(),
                Arc::new(StaticPageFetcher::new("Automated SEO")),
                prompts.clone(),
            )),
            Arc::new(FollowUpService::new(strategist, prompts)),
            "127.0.0.1:0",
        )
    }

    fn request() -> StrategyRequest {
        StrategyRequest::new("outrank.so", 250.0, "Get more traffic").unwrap()
    }

    #[tokio::test]
    async fn submit_stores_strategy_in_session() {
        let tui = port(Arc::new(MockCompletionAdapter::new().with_delay(0)));
        tui.submit(request()).await.unwrap();

        let session = tui.session.lock().await;
        assert!(matches!(
            session.strategy(),
            Some(StrategyResult::Content { .. })
        ));
        assert_eq!(session.request().map(|r| r.budget), Some(250.0));
    }

    #[tokio::test]
    async fn submission_waits_for_session_before_any_call() {
        let analyst = Arc::new(MockCompletionAdapter::new().with_delay(0));
        let tui = port(analyst.clone());

        let held = tui.session.lock().await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), tui.submit(request())).await;
        assert!(blocked.is_err());
        assert!(analyst.requests().is_empty());
        drop(held);

        tui.submit(request()).await.unwrap();
        assert_eq!(analyst.requests().len(), 1);
    }

    #[tokio::test]
    async fn failed_submission_keeps_previous_strategy() {
        let tui = port(Arc::new(MockCompletionAdapter::new().with_delay(0)));
        tui.submit(request()).await.unwrap();

        let failing = port(Arc::new(MockCompletionAdapter::failing(500)));
        *failing.session.lock().await = std::mem::take(&mut *tui.session.lock().await);
        assert!(failing.submit(request()).await.is_err());
        assert!(failing.session.lock().await.has_strategy());
    }

    #[test]
    fn cancel_is_not_an_error() {
        assert!(is_cancel(&InquireError::OperationCanceled));
        assert!(is_cancel(&InquireError::OperationInterrupted));
        assert!(!is_cancel(&InquireError::NotTTY));
    }

    #[test]
    fn prompt_errors_map_to_ui() {
        assert!(matches!(ui_error(InquireError::NotTTY), DomainError::Ui(_)));
    }
}
