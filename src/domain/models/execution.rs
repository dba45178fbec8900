//! Streaming execution events emitted while a plan runs.

use serde::{Deserialize, Serialize};

use super::plan::{Complexity, Plan};

/// Lifecycle status of a single plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Started,
    Completed,
    Failed,
}

/// Terminal classification of a whole plan execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    Success,
    PartialFailure,
    PlanNotFound,
}

/// One emitted event in the execution stream (spec §4.5).
///
/// Variants map 1:1 onto the NDJSON frame `kind` discriminant produced by
/// the streaming transport; this type itself carries no wire framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// Always the first frame of a real (non-empty, non-sentinel) plan's
    /// stream: the planner's own description of what it is about to do
    /// (spec §6).
    PlanDescription { steps: Vec<String>, complexity: Complexity },
    /// Emitted instead of any step frames when no agent is enabled for this
    /// user; terminal in itself (spec §8 scenario 5).
    NoAgentsAvailable { message: String, status: EventStatus },
    PlanNotFound { message: String },
    StepStatus { agent: String, status: EventStatus, detail: Option<String> },
    StepOutput { agent: String, code: Option<String>, summary: Option<String>, answer: Option<String> },
    StepError { agent: String, message: String },
    PlanComplete { outcome: EventOutcome },
}

impl ExecutionEvent {
    pub fn plan_description(plan: &Plan) -> Self {
        Self::PlanDescription { steps: plan.steps.clone(), complexity: plan.complexity }
    }

    pub fn no_agents_available(message: impl Into<String>) -> Self {
        Self::NoAgentsAvailable { message: message.into(), status: EventStatus::Failed }
    }

    pub fn started(agent: impl Into<String>) -> Self {
        Self::StepStatus { agent: agent.into(), status: EventStatus::Started, detail: None }
    }

    pub fn completed(agent: impl Into<String>) -> Self {
        Self::StepStatus { agent: agent.into(), status: EventStatus::Completed, detail: None }
    }

    pub fn failed(agent: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::StepStatus {
            agent: agent.into(),
            status: EventStatus::Failed,
            detail: Some(detail.into()),
        }
    }
}
