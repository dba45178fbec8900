//! AI System (Planned): drives a multi-agent [`Plan`] to completion,
//! emitting one [`ExecutionEvent`] per step (spec §4.5).
//!
//! Grounded on `app.py`'s `_generate_streaming_responses`/
//! `_execute_plan_with_timeout`: get a plan, then execute each step in turn,
//! yielding a status event before and after every agent call, and treating
//! an empty plan as the `plan_not_found` terminal case.

use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Complexity, DatasetDescriptor, EventOutcome, ExecutionEvent, LmContext, Plan, NO_AGENTS_AVAILABLE_STEP};
use crate::domain::ports::lm_adapter::CompletionRequest;
use crate::domain::ports::{LmAdapter, PreferenceRepository};

use super::agent_registry::AgentRegistry;
use super::lm_timeout::complete_with_cap;
use super::planner::Planner;
use super::usage_tracker::UsageTracker;

pub struct AiSystemPlanned {
    registry: Arc<AgentRegistry>,
    planner: Arc<Planner>,
    lm: Arc<dyn LmAdapter>,
    preferences: Arc<dyn PreferenceRepository>,
    usage: Arc<UsageTracker>,
}

impl AiSystemPlanned {
    pub fn new(
        registry: Arc<AgentRegistry>,
        planner: Arc<Planner>,
        lm: Arc<dyn LmAdapter>,
        preferences: Arc<dyn PreferenceRepository>,
        usage: Arc<UsageTracker>,
    ) -> Self {
        Self { registry, planner, lm, preferences, usage }
    }

    #[instrument(skip(self, context), err)]
    pub async fn get_plan(&self, user_id: &str, query: &str, context: &LmContext) -> DomainResult<Plan> {
        self.planner.plan(user_id, query, context).await
    }

    /// Execute `plan` against `dataset`/`goal`, streaming one event per
    /// step. Core agents are never counted against a user's usage tier;
    /// every other agent that actually runs is (spec §4.4).
    pub fn execute_plan(
        self: Arc<Self>,
        user_id: String,
        session_id: String,
        goal: String,
        dataset: Option<DatasetDescriptor>,
        context: LmContext,
        plan: Plan,
        cancellation: CancellationToken,
    ) -> impl Stream<Item = ExecutionEvent> {
        stream! {
            if plan.complexity == Complexity::NoAgentsAvailable
                || plan.steps.first().map(String::as_str) == Some(NO_AGENTS_AVAILABLE_STEP)
            {
                let message = plan
                    .instructions
                    .get(NO_AGENTS_AVAILABLE_STEP)
                    .map(|i| i.instruction.clone())
                    .unwrap_or_else(|| "No agents are currently enabled".to_string());
                yield ExecutionEvent::no_agents_available(message);
                return;
            }

            if plan.is_empty() {
                yield ExecutionEvent::PlanNotFound {
                    message: "no plan found; please try again with a different query".to_string(),
                };
                return;
            }

            yield ExecutionEvent::plan_description(&plan);

            let mut any_failure = false;

            for agent_name in &plan.steps {
                if cancellation.is_cancelled() {
                    any_failure = true;
                    yield ExecutionEvent::failed(agent_name.clone(), "execution cancelled");
                    break;
                }

                yield ExecutionEvent::started(agent_name.clone());

                let instruction = plan
                    .instructions
                    .get(agent_name)
                    .map(|i| i.instruction.clone())
                    .unwrap_or_default();

                let dataset_text = dataset.as_ref().map(DatasetDescriptor::as_prompt_text).unwrap_or_default();
                let prompt = format!("Goal: {goal}\n\nDataset:\n{dataset_text}\n\nInstruction: {instruction}");

                let template = match self.registry.resolve(agent_name).await {
                    Ok(t) => t,
                    Err(e) => {
                        any_failure = true;
                        let contained = e.is_agent_contained();
                        yield ExecutionEvent::failed(agent_name.clone(), e.to_string());
                        if !contained {
                            yield ExecutionEvent::PlanComplete { outcome: EventOutcome::PartialFailure };
                            return;
                        }
                        continue;
                    }
                };

                let request = CompletionRequest {
                    system_prompt: template.prompt_template.clone(),
                    user_prompt: prompt,
                    context: context.clone(),
                };

                match complete_with_cap(&self.lm, request, &cancellation).await {
                    Ok(response) => {
                        if !crate::domain::models::AgentTemplate::is_core(agent_name) {
                            let _ = self.preferences.record_usage(&user_id, agent_name).await;
                        }
                        let _ = self
                            .usage
                            .record(
                                &user_id,
                                &session_id,
                                agent_name,
                                &context.model,
                                response.usage.prompt_tokens,
                                response.usage.completion_tokens,
                            )
                            .await;

                        yield ExecutionEvent::StepOutput {
                            agent: agent_name.clone(),
                            code: Some(response.text.clone()),
                            summary: Some(response.text),
                            answer: None,
                        };
                        yield ExecutionEvent::completed(agent_name.clone());
                    }
                    Err(e) => {
                        any_failure = true;
                        yield ExecutionEvent::failed(agent_name.clone(), e.to_string());
                        if !e.is_agent_contained() {
                            yield ExecutionEvent::PlanComplete { outcome: EventOutcome::PartialFailure };
                            return;
                        }
                    }
                }
            }

            let outcome = if any_failure { EventOutcome::PartialFailure } else { EventOutcome::Success };
            yield ExecutionEvent::PlanComplete { outcome };
        }
    }
}
