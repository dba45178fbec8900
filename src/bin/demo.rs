//! Command-line demo driving the orchestration core end to end against an
//! in-memory database and a mock LM adapter — no network calls, no API
//! keys required. Prints the streamed NDJSON frames for a single query.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use autoanalyst_core::adapters::lm::MockLmAdapter;
use autoanalyst_core::adapters::sqlite::{
    connection::open_in_memory, preference_repository::SqlitePreferenceRepository,
    template_repository::SqliteTemplateRepository, usage_repository::SqliteUsageRepository,
};
use autoanalyst_core::domain::models::{AgentTemplate, AgentVariant, LmContext, CORE_AGENT_NAMES};
use autoanalyst_core::domain::ports::LmAdapter;
use autoanalyst_core::infrastructure::logging::LoggerImpl;
use autoanalyst_core::services::{streaming, AgentRegistry, AiSystemPlanned, Planner, UsageTracker};

#[derive(Parser)]
#[command(name = "autoanalyst-demo")]
#[command(about = "Run a single query through the orchestrator core against an in-memory store")]
#[command(version)]
struct Cli {
    /// Natural-language analysis request.
    #[arg(default_value = "Find the strongest correlation in the dataset and visualize it")]
    query: String,

    /// Simulated planner response, e.g. "preprocessing_agent -> data_viz_agent".
    #[arg(long, default_value = "preprocessing_agent -> data_viz_agent")]
    mock_plan: String,

    /// User id to plan and account usage for.
    #[arg(long, default_value = "demo-user")]
    user_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging_config = autoanalyst_core::domain::models::config::LoggingConfig::default();
    LoggerImpl::init(&logging_config).context("failed to initialize logging")?;

    let pool = open_in_memory().await.context("failed to open in-memory database")?;
    let templates = Arc::new(SqliteTemplateRepository::new(pool.clone()));
    let preferences = Arc::new(SqlitePreferenceRepository::new(pool.clone()));
    let usage_repo = Arc::new(SqliteUsageRepository::new(pool));

    for name in CORE_AGENT_NAMES {
        templates.insert(AgentTemplate::new(*name, AgentVariant::Both)).await?;
    }

    let registry = Arc::new(AgentRegistry::new(templates, preferences.clone()));
    let lm: Arc<dyn LmAdapter> = Arc::new(MockLmAdapter::new(cli.mock_plan));
    let planner = Arc::new(Planner::new(registry.clone(), lm.clone()));
    let usage = Arc::new(UsageTracker::new(usage_repo));

    let system = Arc::new(AiSystemPlanned::new(registry, planner, lm, preferences, usage.clone()));

    let context = LmContext::default();
    let plan = system.get_plan(&cli.user_id, &cli.query, &context).await?;
    tracing::info!(plan = ?plan, "generated plan");

    let events = system.execute_plan(
        cli.user_id.clone(),
        "demo-session".to_string(),
        cli.query,
        None,
        context,
        plan,
        CancellationToken::new(),
    );
    let mut frames = Box::pin(streaming::frame_stream(events));
    while let Some(frame) = frames.next().await {
        print!("{frame}");
    }

    let summary = usage.summary_for_user(&cli.user_id).await?;
    tracing::info!(?summary, "final usage summary");

    Ok(())
}
