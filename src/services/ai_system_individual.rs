//! AI System (Individual): invokes a single named agent directly via
//! `@agent` syntax, bypassing the planner (spec §4.1, `Forward` operation).
//!
//! Grounded on `app.py`'s `chat_with_agent` path: resolve the template,
//! build its signature-driven prompt, call the model once, return the
//! formatted output. Unlike the planned path this never touches the
//! per-user usage tier for core agents either, consistent with §4.4.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AgentTemplate, DatasetDescriptor, LmContext, SignatureMode, BASIC_QA_AGENT};
use crate::domain::ports::lm_adapter::{CompletionRequest, CompletionResponse};
use crate::domain::ports::{LmAdapter, PreferenceRepository};

use super::agent_registry::AgentRegistry;
use super::lm_timeout::complete_with_cap;
use super::usage_tracker::UsageTracker;

/// One agent's output from a `Forward` call (spec §4.4). Untagged so a
/// code-producing agent serializes as `{"code": ..., "summary": ...}`, a
/// question-answering agent as `{"answer": ...}`, and a failed agent as
/// `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentOutput {
    Code { code: String, summary: String },
    Answer { answer: String },
    Error { error: String },
}

pub struct AiSystemIndividual {
    registry: Arc<AgentRegistry>,
    lm: Arc<dyn LmAdapter>,
    preferences: Arc<dyn PreferenceRepository>,
    usage: Arc<UsageTracker>,
}

impl AiSystemIndividual {
    pub fn new(
        registry: Arc<AgentRegistry>,
        lm: Arc<dyn LmAdapter>,
        preferences: Arc<dyn PreferenceRepository>,
        usage: Arc<UsageTracker>,
    ) -> Self {
        Self { registry, lm, preferences, usage }
    }

    /// Invoke every agent named in `agent_spec` directly against
    /// `goal`/`dataset` (spec §4.4's `Forward` operation). `agent_spec` is a
    /// comma-separated list (e.g. `"preprocessing_agent,data_viz_agent"`);
    /// each named agent runs independently and a per-agent failure is
    /// contained to that agent's entry rather than failing the whole call.
    /// Always available regardless of the per-user enabled/disabled toggle,
    /// which only gates the planner view.
    #[instrument(skip(self, dataset, context), err)]
    pub async fn forward(
        &self,
        user_id: &str,
        session_id: &str,
        agent_spec: &str,
        goal: &str,
        dataset: Option<&DatasetDescriptor>,
        context: &LmContext,
        cancellation: &CancellationToken,
    ) -> DomainResult<BTreeMap<String, AgentOutput>> {
        let mut mapping = BTreeMap::new();
        for agent_name in agent_spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let output = match self
                .forward_single(user_id, session_id, agent_name, goal, dataset, context, cancellation)
                .await
            {
                Ok(output) => output,
                Err(e) => AgentOutput::Error { error: e.to_string() },
            };
            mapping.insert(agent_name.to_string(), output);
        }
        Ok(mapping)
    }

    async fn forward_single(
        &self,
        user_id: &str,
        session_id: &str,
        agent_name: &str,
        goal: &str,
        dataset: Option<&DatasetDescriptor>,
        context: &LmContext,
        cancellation: &CancellationToken,
    ) -> DomainResult<AgentOutput> {
        let template = self.registry.resolve(agent_name).await?;
        let _signature = AgentRegistry::signature_for(&template, SignatureMode::Individual);

        let dataset_text = dataset.map(DatasetDescriptor::as_prompt_text).unwrap_or_default();
        let prompt = format!("Goal: {goal}\n\nDataset:\n{dataset_text}");

        let request = CompletionRequest {
            system_prompt: template.prompt_template.clone(),
            user_prompt: prompt,
            context: context.clone(),
        };
        let response: CompletionResponse = complete_with_cap(&self.lm, request, cancellation).await?;

        if !AgentTemplate::is_core(agent_name) {
            let _ = self.preferences.record_usage(user_id, agent_name).await;
        }
        self.usage
            .record(user_id, session_id, agent_name, &context.model, response.usage.prompt_tokens, response.usage.completion_tokens)
            .await?;

        Ok(if agent_name == BASIC_QA_AGENT {
            AgentOutput::Answer { answer: response.text }
        } else {
            AgentOutput::Code { code: response.text.clone(), summary: response.text }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::lm::MockLmAdapter;
    use crate::adapters::sqlite::{
        connection::open_in_memory, preference_repository::SqlitePreferenceRepository,
        template_repository::SqliteTemplateRepository, usage_repository::SqliteUsageRepository,
    };
    use crate::domain::models::AgentVariant;

    #[tokio::test]
    async fn forward_resolves_and_invokes_the_named_agent() {
        let pool = open_in_memory().await.unwrap();
        let templates = Arc::new(SqliteTemplateRepository::new(pool.clone()));
        let preferences = Arc::new(SqlitePreferenceRepository::new(pool.clone()));
        let usage_repo = Arc::new(SqliteUsageRepository::new(pool));
        templates
            .insert(AgentTemplate::new("preprocessing_agent", AgentVariant::Both))
            .await
            .unwrap();

        let registry = Arc::new(AgentRegistry::new(templates, preferences.clone()));
        let lm: Arc<dyn LmAdapter> = Arc::new(MockLmAdapter::new("cleaned dataframe"));
        let usage = Arc::new(UsageTracker::new(usage_repo));
        let system = AiSystemIndividual::new(registry, lm, preferences, usage);

        let result = system
            .forward(
                "alice",
                "s1",
                "preprocessing_agent",
                "clean this",
                None,
                &LmContext::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        match &result["preprocessing_agent"] {
            AgentOutput::Code { code, summary } => {
                assert_eq!(code, "cleaned dataframe");
                assert_eq!(summary, "cleaned dataframe");
            }
            other => panic!("expected Code output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn forward_runs_every_comma_separated_agent_independently() {
        let pool = open_in_memory().await.unwrap();
        let templates = Arc::new(SqliteTemplateRepository::new(pool.clone()));
        let preferences = Arc::new(SqlitePreferenceRepository::new(pool.clone()));
        let usage_repo = Arc::new(SqliteUsageRepository::new(pool));
        templates.insert(AgentTemplate::new("preprocessing_agent", AgentVariant::Both)).await.unwrap();
        templates.insert(AgentTemplate::new("data_viz_agent", AgentVariant::Both)).await.unwrap();

        let registry = Arc::new(AgentRegistry::new(templates, preferences.clone()));
        let lm: Arc<dyn LmAdapter> = Arc::new(MockLmAdapter::new("output"));
        let usage = Arc::new(UsageTracker::new(usage_repo));
        let system = AiSystemIndividual::new(registry, lm, preferences, usage);

        let mapping = system
            .forward(
                "alice",
                "s1",
                "preprocessing_agent,data_viz_agent",
                "clean and plot",
                None,
                &LmContext::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(mapping.len(), 2);
        assert!(mapping.contains_key("preprocessing_agent"));
        assert!(mapping.contains_key("data_viz_agent"));
    }

    #[tokio::test]
    async fn forward_contains_an_unknown_agent_failure_to_its_own_entry() {
        let pool = open_in_memory().await.unwrap();
        let templates = Arc::new(SqliteTemplateRepository::new(pool.clone()));
        let preferences = Arc::new(SqlitePreferenceRepository::new(pool.clone()));
        let usage_repo = Arc::new(SqliteUsageRepository::new(pool));
        templates.insert(AgentTemplate::new("preprocessing_agent", AgentVariant::Both)).await.unwrap();

        let registry = Arc::new(AgentRegistry::new(templates, preferences.clone()));
        let lm: Arc<dyn LmAdapter> = Arc::new(MockLmAdapter::new("output"));
        let usage = Arc::new(UsageTracker::new(usage_repo));
        let system = AiSystemIndividual::new(registry, lm, preferences, usage);

        let mapping = system
            .forward(
                "alice",
                "s1",
                "preprocessing_agent,nonexistent_agent",
                "clean and plot",
                None,
                &LmContext::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(matches!(mapping["preprocessing_agent"], AgentOutput::Code { .. }));
        assert!(matches!(mapping["nonexistent_agent"], AgentOutput::Error { .. }));
    }
}
