//! Planner: classifies a query's complexity and produces a [`Plan`] by
//! delegating to the matching sub-planner LM prompt (spec §4.3).
//!
//! Grounded on the teacher's `LlmPlanner`: build a prompt, call the LM
//! adapter, then parse the raw text response into a structured value at a
//! single boundary (`parse_decomposition` there, `Plan::parse_steps`/the
//! JSON-instruction block here).

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::instrument;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Complexity, LmContext, Plan, StepInstruction, BASIC_QA_AGENT};
use crate::domain::ports::lm_adapter::CompletionRequest;
use crate::domain::ports::LmAdapter;

use super::agent_registry::AgentRegistry;

/// Classify then plan a user query against the agents available to
/// `user_id` (spec §4.3).
pub struct Planner {
    registry: Arc<AgentRegistry>,
    lm: Arc<dyn LmAdapter>,
}

impl Planner {
    pub fn new(registry: Arc<AgentRegistry>, lm: Arc<dyn LmAdapter>) -> Self {
        Self { registry, lm }
    }

    /// Classify `query` into a complexity tier by asking the LM to pick one
    /// of the five labels (spec §4.3). Unparseable responses default to
    /// `Intermediate`, the middle tier, rather than erroring the whole turn.
    #[instrument(skip(self, context), err)]
    pub async fn classify(&self, query: &str, context: &LmContext) -> DomainResult<Complexity> {
        let request = CompletionRequest {
            system_prompt: CLASSIFY_SYSTEM_PROMPT.to_string(),
            user_prompt: query.to_string(),
            context: context.clone(),
        };
        let response = self.lm.complete(request).await?;
        Ok(parse_complexity(&response.text))
    }

    /// Produce a full plan for `query`, classifying first and then running
    /// the matching sub-planner. An `Advanced` classification whose
    /// sub-planner fails falls back to the `Intermediate` sub-planner
    /// (spec §9 Open Question: advanced -> intermediate fallback preserved
    /// from the original system).
    #[instrument(skip(self, context), err)]
    pub async fn plan(&self, user_id: &str, query: &str, context: &LmContext) -> DomainResult<Plan> {
        let agent_names = self.registry.planner_agent_names(user_id).await?;
        if agent_names.len() == 1 && agent_names[0] == BASIC_QA_AGENT {
            return Ok(Plan::no_agents_available(
                "enable at least one agent in your template preferences before planning",
            ));
        }

        let complexity = self.classify(query, context).await?;
        match complexity {
            Complexity::Unrelated => Ok(Plan::basic_qa()),
            Complexity::Basic => self.run_sub_planner(query, context, &agent_names, Complexity::Basic).await,
            Complexity::Intermediate => {
                self.run_sub_planner(query, context, &agent_names, Complexity::Intermediate).await
            }
            Complexity::Advanced => {
                match self.run_sub_planner(query, context, &agent_names, Complexity::Advanced).await {
                    Ok(plan) => Ok(plan),
                    Err(_) => {
                        self.run_sub_planner(query, context, &agent_names, Complexity::Intermediate).await
                    }
                }
            }
            Complexity::NoAgentsAvailable => {
                Ok(Plan::no_agents_available("no agents available for planning"))
            }
        }
    }

    async fn run_sub_planner(
        &self,
        query: &str,
        context: &LmContext,
        agent_names: &[String],
        complexity: Complexity,
    ) -> DomainResult<Plan> {
        let system_prompt = sub_planner_prompt(complexity, agent_names);
        let request = CompletionRequest {
            system_prompt,
            user_prompt: query.to_string(),
            context: context.clone(),
        };
        let response = self.lm.complete(request).await?;
        parse_plan_response(&response.text, complexity)
    }
}

const CLASSIFY_SYSTEM_PROMPT: &str = "Classify the user's data analysis query as one of: \
basic, intermediate, advanced, unrelated. Respond with exactly one word.";

fn sub_planner_prompt(complexity: Complexity, agent_names: &[String]) -> String {
    format!(
        "You are a {complexity:?} planner. Available agents: {}. \
         Respond with an arrow-separated pipeline (e.g. `agentA -> agentB`) \
         followed by a JSON object mapping each agent name to \
         {{\"create\": [...], \"use\": [...], \"instruction\": \"...\"}}.",
        agent_names.join(", ")
    )
}

fn parse_complexity(text: &str) -> Complexity {
    match text.trim().to_lowercase().as_str() {
        "basic" => Complexity::Basic,
        "advanced" => Complexity::Advanced,
        "unrelated" => Complexity::Unrelated,
        _ => Complexity::Intermediate,
    }
}

/// Parse a sub-planner's raw response into a [`Plan`]: the arrow-syntax
/// pipeline on the first line, an optional JSON instruction block after it.
fn parse_plan_response(response: &str, complexity: Complexity) -> DomainResult<Plan> {
    let mut lines = response.trim().lines();
    let pipeline_line = lines
        .next()
        .ok_or_else(|| DomainError::ValidationFailed("planner response was empty".to_string()))?;
    let steps = Plan::parse_steps(pipeline_line);

    // The planner must not emit the same agent twice in one plan, and the
    // basic QA agent may appear only as a sole step (spec §4.3's tie-break
    // invariants).
    let mut seen = HashSet::new();
    for step in &steps {
        if !seen.insert(step.as_str()) {
            return Err(DomainError::ValidationFailed(format!(
                "planner emitted duplicate agent '{step}' in one plan"
            )));
        }
    }
    if steps.len() > 1 && steps.iter().any(|s| s == BASIC_QA_AGENT) {
        return Err(DomainError::ValidationFailed(
            "basic_qa_agent may only appear as a sole step".to_string(),
        ));
    }

    let rest: String = lines.collect::<Vec<_>>().join("\n");
    let json_str = extract_json_from_response(&rest);
    let instructions: BTreeMap<String, StepInstruction> = if json_str.trim().is_empty() {
        BTreeMap::new()
    } else {
        serde_json::from_str(&json_str).map_err(|e| {
            DomainError::ValidationFailed(format!("failed to parse plan instructions as JSON: {e}"))
        })?
    };

    Ok(Plan { complexity, steps, instructions })
}

/// Strip a markdown code fence around a JSON blob, if present.
fn extract_json_from_response(response: &str) -> String {
    let trimmed = response.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        if let Some(end) = stripped.rfind("```") {
            return stripped[..end].trim().to_string();
        }
    }
    if let Some(stripped) = trimmed.strip_prefix("```") {
        if let Some(end) = stripped.rfind("```") {
            return stripped[..end].trim().to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_complexity_defaults_to_intermediate_on_garbage() {
        assert_eq!(parse_complexity("basic"), Complexity::Basic);
        assert_eq!(parse_complexity("gibberish"), Complexity::Intermediate);
    }

    #[test]
    fn parse_plan_response_handles_pipeline_and_json_block() {
        let response = "preprocessing_agent -> data_viz_agent\n```json\n{\"preprocessing_agent\": {\"create\": [\"clean_df\"], \"use\": [], \"instruction\": \"clean it\"}}\n```";
        let plan = parse_plan_response(response, Complexity::Basic).unwrap();
        assert_eq!(plan.steps, vec!["preprocessing_agent", "data_viz_agent"]);
        assert_eq!(plan.instructions.len(), 1);
        assert_eq!(plan.instructions["preprocessing_agent"].instruction, "clean it");
    }

    #[test]
    fn parse_plan_response_tolerates_missing_json_block() {
        let plan = parse_plan_response("data_viz_agent", Complexity::Basic).unwrap();
        assert_eq!(plan.steps, vec!["data_viz_agent"]);
        assert!(plan.instructions.is_empty());
    }

    #[test]
    fn parse_plan_response_rejects_duplicate_agents() {
        let err = parse_plan_response("data_viz_agent -> data_viz_agent", Complexity::Basic).unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[test]
    fn parse_plan_response_rejects_basic_qa_agent_as_non_sole_step() {
        let response = format!("preprocessing_agent -> {BASIC_QA_AGENT}");
        let err = parse_plan_response(&response, Complexity::Basic).unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[test]
    fn parse_plan_response_allows_basic_qa_agent_as_sole_step() {
        let plan = parse_plan_response(BASIC_QA_AGENT, Complexity::Unrelated).unwrap();
        assert_eq!(plan.steps, vec![BASIC_QA_AGENT.to_string()]);
    }
}
