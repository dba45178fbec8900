//! Deep Analyzer: runs the fixed seven-stage analysis pipeline, persisting
//! progress after each stage and streaming a status event per stage
//! (spec §4.8).
//!
//! Grounded on `app.py`'s `_generate_deep_analysis_stream`, whose
//! `update_report_in_db` callback persists status/progress/content after
//! every step; here that becomes a repository `update` call threaded
//! through the same loop that emits the stream.

use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DatasetDescriptor, DeepAnalysisReport, LmContext, StageOutput, DEEP_ANALYSIS_STAGES};
use crate::domain::ports::lm_adapter::CompletionRequest;
use crate::domain::ports::{DeepAnalysisRepository, LmAdapter};

use super::lm_timeout::complete_with_cap;
use super::usage_tracker::{compute_cost, resolve_tier};

/// One event in a deep analysis run's stream.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeepAnalysisEvent {
    StageStarted { stage: String },
    StageCompleted { stage: String, content: String },
    Failed { message: String },
    Finished { final_report: String },
}

pub struct DeepAnalyzer {
    lm: Arc<dyn LmAdapter>,
    repository: Arc<dyn DeepAnalysisRepository>,
}

impl DeepAnalyzer {
    pub fn new(lm: Arc<dyn LmAdapter>, repository: Arc<dyn DeepAnalysisRepository>) -> Self {
        Self { lm, repository }
    }

    #[instrument(skip(self), err)]
    pub async fn start(&self, user_id: &str, session_id: &str, goal: &str) -> DomainResult<Uuid> {
        let id = Uuid::new_v4();
        let report = DeepAnalysisReport::start(id, user_id, session_id, goal);
        self.repository.insert(&report).await?;
        Ok(id)
    }

    /// Run every remaining stage for `report_id`, persisting after each one
    /// and yielding the matching event. Resumable: a report that already
    /// has some stages recorded picks up from `next_stage()`.
    pub fn run(
        self: Arc<Self>,
        report_id: Uuid,
        dataset: Option<DatasetDescriptor>,
        context: LmContext,
        cancellation: CancellationToken,
    ) -> impl Stream<Item = DeepAnalysisEvent> {
        stream! {
            let mut report = match self.repository.get(report_id).await {
                Ok(Some(r)) => r,
                Ok(None) => {
                    yield DeepAnalysisEvent::Failed { message: format!("report {report_id} not found") };
                    return;
                }
                Err(e) => {
                    yield DeepAnalysisEvent::Failed { message: e.to_string() };
                    return;
                }
            };

            report.begin_running();

            while let Some((stage_name, progress)) = report.next_stage() {
                if cancellation.is_cancelled() {
                    report.fail("cancelled");
                    let _ = self.repository.update(&report).await;
                    yield DeepAnalysisEvent::Failed { message: "cancelled".to_string() };
                    return;
                }

                yield DeepAnalysisEvent::StageStarted { stage: stage_name.to_string() };

                let dataset_text = dataset.as_ref().map(DatasetDescriptor::as_prompt_text).unwrap_or_default();
                let prior = report
                    .stages
                    .iter()
                    .map(|s| format!("## {}\n{}", s.stage, s.content))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                let prompt = format!(
                    "Goal: {}\n\nDataset:\n{dataset_text}\n\nPrior stages:\n{prior}",
                    report.goal
                );

                let request = CompletionRequest {
                    system_prompt: stage_prompt(stage_name),
                    user_prompt: prompt,
                    context: context.clone(),
                };

                match complete_with_cap(&self.lm, request, &cancellation).await {
                    Ok(response) => {
                        let tier = resolve_tier(&context.model);
                        let cost = compute_cost(&context.model, response.usage.prompt_tokens, response.usage.completion_tokens);
                        report.add_usage(tier.credits(), u64::from(response.usage.prompt_tokens + response.usage.completion_tokens), cost);
                        report.push_stage(StageOutput::new(stage_name, response.text.clone(), progress));
                        if let Err(e) = self.repository.update(&report).await {
                            yield DeepAnalysisEvent::Failed { message: e.to_string() };
                            return;
                        }
                        yield DeepAnalysisEvent::StageCompleted { stage: stage_name.to_string(), content: response.text };
                    }
                    Err(e) => {
                        report.fail(e.to_string());
                        let _ = self.repository.update(&report).await;
                        yield DeepAnalysisEvent::Failed { message: e.to_string() };
                        return;
                    }
                }
            }

            let final_report = report.stages.last().map(|s| s.content.clone()).unwrap_or_default();
            report.complete(final_report.clone());
            if let Err(e) = self.repository.update(&report).await {
                yield DeepAnalysisEvent::Failed { message: e.to_string() };
                return;
            }
            yield DeepAnalysisEvent::Finished { final_report };
        }
    }

    pub async fn get(&self, report_id: Uuid) -> DomainResult<Option<DeepAnalysisReport>> {
        self.repository.get(report_id).await
    }
}

fn stage_prompt(stage: &str) -> String {
    format!("You are running the '{stage}' stage of a deep data analysis pipeline. Produce its output only.")
}
