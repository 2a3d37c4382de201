//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI or API.
//! No business logic here.
//!
//! `site-strategist`        interactive dashboard
//! `site-strategist serve`  HTTP API only

use dotenv::dotenv;
use site_strategist::adapters::ai::{MockCompletionAdapter, OpenAiAdapter};
use site_strategist::adapters::http::{self, ApiState};
use site_strategist::adapters::ui::tui::TuiInputPort;
use site_strategist::adapters::web::HttpPageFetcher;
use site_strategist::ports::{CompletionPort, InputPort, PageFetcherPort};
use site_strategist::shared::config::AppConfig;
use site_strategist::usecases::{FollowUpService, PromptBuilder, StrategyService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config could not be loaded, using defaults");
        AppConfig::default()
    });
    let serve_only = std::env::args().nth(1).as_deref() == Some("serve");

    // --- AI services: analysis (step one) and strategy (step two, also answers follow-ups) ---
    let (analyst, strategist): (Arc<dyn CompletionPort>, Arc<dyn CompletionPort>) =
        if cfg.is_mock_ai() {
            warn!("STRATEGIST_MOCK_AI is set, using mock AI adapters (offline demo)");
            (
                Arc::new(MockCompletionAdapter::new().named("ChatGPT")),
                Arc::new(MockCompletionAdapter::new().named("Gemini")),
            )
        } else {
            if !cfg.are_keys_present() {
                warn!(
                    analysis_key = %cfg.analysis_key_var_or_default(),
                    strategy_key = %cfg.strategy_key_var_or_default(),
                    "API keys are not set; requests will fail until they are"
                );
            }
            info!(
                analysis_model = %cfg.analysis_model_or_default(),
                strategy_model = %cfg.strategy_model_or_default(),
                format = ?cfg.strategy_format_or_default(),
                "AI adapters configured"
            );
            (
                Arc::new(OpenAiAdapter::new(
                    "ChatGPT".to_string(),
                    cfg.analysis_api_url_or_default(),
                    cfg.analysis_key_var_or_default(),
                    cfg.analysis_model_or_default(),
                )),
                Arc::new(OpenAiAdapter::new(
                    "Gemini".to_string(),
                    cfg.strategy_api_url_or_default(),
                    cfg.strategy_key_var_or_default(),
                    cfg.strategy_model_or_default(),
                )),
            )
        };

    // --- Page fetcher (best effort, bounded by timeout) ---
    let fetch_timeout_ms = cfg.fetch_timeout_ms_or_default();
    let fetcher: Arc<dyn PageFetcherPort> = Arc::new(
        HttpPageFetcher::new(
            Duration::from_millis(fetch_timeout_ms),
            cfg.page_char_limit_or_default(),
        )
        .map_err(|e| anyhow::anyhow!("{}", e))?,
    );
    info!(
        fetch_timeout_ms,
        page_char_limit = cfg.page_char_limit_or_default(),
        "page fetcher ready"
    );

    // --- Services ---
    let prompts = PromptBuilder::new(
        cfg.strategy_format_or_default(),
        cfg.analysis_max_tokens_or_default(),
        cfg.strategy_temperature_or_default(),
    );
    let strategy_service = Arc::new(StrategyService::new(
        analyst,
        Arc::clone(&strategist),
        fetcher,
        prompts.clone(),
    ));
    let followup_service = Arc::new(FollowUpService::new(strategist, prompts));

    let bind_addr = cfg.bind_addr_or_default();
    if serve_only {
        let state = ApiState {
            strategy: strategy_service,
            followup: followup_service,
        };
        return http::serve(&bind_addr, state)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e));
    }

    site_strategist::adapters::ui::init_ui();

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        strategy_service,
        followup_service,
        bind_addr,
    ));

    // --- Run (main menu -> Generate / Follow-up / HTTP API) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
