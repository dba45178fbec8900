//! End-to-end coverage of the orchestration core against an in-memory
//! database and mock LM adapter, mirroring the teacher's `database_test.rs`
//! style integration tests.

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use autoanalyst_core::adapters::lm::MockLmAdapter;
use autoanalyst_core::adapters::sqlite::connection::open_in_memory;
use autoanalyst_core::adapters::sqlite::{
    SqliteDeepAnalysisRepository, SqlitePreferenceRepository, SqliteTemplateRepository, SqliteUsageRepository,
};
use autoanalyst_core::domain::models::{
    AgentTemplate, AgentVariant, Complexity, ExecutionEvent, LmContext, Plan, UserTemplatePreference,
    CORE_AGENT_NAMES,
};
use autoanalyst_core::domain::ports::LmAdapter;
use autoanalyst_core::services::{AgentRegistry, AiSystemPlanned, DeepAnalyzer, Planner, SessionManager, UsageTracker};

async fn seeded_pool() -> sqlx::SqlitePool {
    open_in_memory().await.expect("failed to open in-memory database")
}

#[tokio::test]
async fn planner_caps_non_core_templates_at_ten_ordered_by_usage() {
    let pool = seeded_pool().await;
    let templates = Arc::new(SqliteTemplateRepository::new(pool.clone()));
    let preferences = Arc::new(SqlitePreferenceRepository::new(pool));

    for name in CORE_AGENT_NAMES {
        templates.insert(AgentTemplate::new(*name, AgentVariant::Both)).await.unwrap();
    }
    for i in 0..15 {
        let name = format!("custom_agent_{i}");
        templates.insert(AgentTemplate::new(&name, AgentVariant::Both)).await.unwrap();
        let mut pref = UserTemplatePreference::new("alice", &name, true);
        pref.usage_count = i;
        preferences.upsert(pref).await.unwrap();
    }

    let registry = AgentRegistry::new(templates, preferences);
    let planner_templates = registry.planner_templates("alice").await.unwrap();

    let non_core_count = planner_templates
        .iter()
        .filter(|t| !AgentTemplate::is_core(&t.name))
        .count();
    assert_eq!(non_core_count, 10);

    // Highest usage_count templates should be the ones kept.
    let names: Vec<_> = planner_templates.iter().map(|t| t.name.clone()).collect();
    assert!(names.contains(&"custom_agent_14".to_string()));
    assert!(!names.contains(&"custom_agent_0".to_string()));
}

#[tokio::test]
async fn toggle_preference_is_idempotent_latest_call_wins() {
    let pool = seeded_pool().await;
    let preferences = SqlitePreferenceRepository::new(pool);

    preferences.upsert(UserTemplatePreference::new("alice", "custom_agent", true)).await.unwrap();
    preferences.upsert(UserTemplatePreference::new("alice", "custom_agent", false)).await.unwrap();
    preferences.upsert(UserTemplatePreference::new("alice", "custom_agent", false)).await.unwrap();

    let pref = preferences.get("alice", "custom_agent").await.unwrap().unwrap();
    assert!(!pref.enabled);
}

#[tokio::test]
async fn toggle_preference_checked_refuses_to_disable_the_last_enabled_planner_agent() {
    let pool = seeded_pool().await;
    let templates = Arc::new(SqliteTemplateRepository::new(pool.clone()));
    let preferences = Arc::new(SqlitePreferenceRepository::new(pool));

    templates.insert(AgentTemplate::new("custom_agent", AgentVariant::Both)).await.unwrap();
    let registry = AgentRegistry::new(templates, preferences);
    registry.toggle("alice", "custom_agent", true).await.unwrap();

    let err = registry.toggle_preference_checked("alice", "custom_agent", false).await.unwrap_err();
    assert!(matches!(err, autoanalyst_core::domain::errors::DomainError::ValidationFailed(_)));
}

#[tokio::test]
async fn no_agents_enabled_yields_no_agents_available_plan() {
    let pool = seeded_pool().await;
    let templates = Arc::new(SqliteTemplateRepository::new(pool.clone()));
    let preferences = Arc::new(SqlitePreferenceRepository::new(pool));
    // No core agents registered and no preferences: only basic_qa_agent remains.
    let registry = Arc::new(AgentRegistry::new(templates, preferences));
    let lm: Arc<dyn LmAdapter> = Arc::new(MockLmAdapter::new("irrelevant"));
    let planner = Planner::new(registry, lm);

    let plan = planner.plan("alice", "analyze this", &LmContext::default()).await.unwrap();
    assert_eq!(plan.complexity, Complexity::NoAgentsAvailable);
}

#[tokio::test]
async fn full_plan_execution_streams_events_and_records_usage() {
    let pool = seeded_pool().await;
    let templates = Arc::new(SqliteTemplateRepository::new(pool.clone()));
    let preferences = Arc::new(SqlitePreferenceRepository::new(pool.clone()));
    let usage_repo = Arc::new(SqliteUsageRepository::new(pool));

    for name in CORE_AGENT_NAMES {
        templates.insert(AgentTemplate::new(*name, AgentVariant::Both)).await.unwrap();
    }

    let registry = Arc::new(AgentRegistry::new(templates, preferences.clone()));
    let lm: Arc<dyn LmAdapter> = Arc::new(MockLmAdapter::new("analysis result"));
    let planner = Arc::new(Planner::new(registry.clone(), lm.clone()));
    let usage = Arc::new(UsageTracker::new(usage_repo));
    let system = Arc::new(AiSystemPlanned::new(registry, planner, lm, preferences, usage.clone()));

    let plan = Plan::single(Complexity::Basic, "preprocessing_agent");
    let events: Vec<_> = system
        .execute_plan(
            "alice".to_string(),
            "session-1".to_string(),
            "clean my dataset".to_string(),
            None,
            LmContext::default(),
            plan,
            CancellationToken::new(),
        )
        .collect()
        .await;

    assert!(events.iter().any(|e| matches!(e, ExecutionEvent::PlanDescription { .. })));
    assert!(events.iter().any(|e| matches!(e, ExecutionEvent::StepOutput { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        ExecutionEvent::PlanComplete { outcome: autoanalyst_core::domain::models::EventOutcome::Success }
    )));

    let summary = usage.summary_for_user("alice").await.unwrap();
    assert_eq!(summary.call_count, 1);
}

#[tokio::test]
async fn deep_analysis_runs_seven_stages_and_session_manager_tracks_readiness() {
    let pool = seeded_pool().await;
    let repository = Arc::new(SqliteDeepAnalysisRepository::new(pool));
    let lm: Arc<dyn LmAdapter> = Arc::new(MockLmAdapter::new("stage result"));
    let analyzer = Arc::new(DeepAnalyzer::new(lm, repository));
    let sessions = SessionManager::new();

    sessions.set_user("s1", "alice").await.unwrap();
    assert!(!sessions.has_ready_deep_analyzer("s1").await);

    let report_id = analyzer.start("alice", "s1", "find trends").await.unwrap();
    let events: Vec<_> = analyzer
        .clone()
        .run(report_id, None, LmContext::default(), CancellationToken::new())
        .collect()
        .await;
    assert!(matches!(
        events.last().unwrap(),
        autoanalyst_core::services::DeepAnalysisEvent::Finished { .. }
    ));

    sessions.mark_deep_analyzer_ready("s1", "alice").await.unwrap();
    assert!(sessions.has_ready_deep_analyzer("s1").await);

    sessions.set_user("s1", "bob").await.unwrap();
    assert!(!sessions.has_ready_deep_analyzer("s1").await);
}
