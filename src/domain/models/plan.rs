//! Plan as data (DESIGN NOTES): the planner's output is a structured value,
//! never a raw string, parsed once at the planner boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::agent_template::BASIC_QA_AGENT;

/// Complexity tier assigned by the classifier (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
    Unrelated,
    NoAgentsAvailable,
}

/// Per-step I/O contract: which variables this step creates, which it
/// consumes from earlier steps, and the natural-language instruction for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInstruction {
    pub create: Vec<String>,
    #[serde(rename = "use")]
    pub use_: Vec<String>,
    pub instruction: String,
}

/// Sentinel step name standing in for "no plan" when no agent is enabled
/// for this user (spec §8 scenario 5). Never resolved against the agent
/// registry; the executor special-cases it before any `resolve` call.
pub const NO_AGENTS_AVAILABLE_STEP: &str = "no_agents_available";

/// An ordered agent sequence with per-agent variable contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub complexity: Complexity,
    pub steps: Vec<String>,
    pub instructions: BTreeMap<String, StepInstruction>,
}

impl Plan {
    pub fn no_agents_available(remediation: impl Into<String>) -> Self {
        let mut instructions = BTreeMap::new();
        instructions.insert(
            NO_AGENTS_AVAILABLE_STEP.to_string(),
            StepInstruction { create: vec![], use_: vec![], instruction: remediation.into() },
        );
        Self {
            complexity: Complexity::NoAgentsAvailable,
            steps: vec![NO_AGENTS_AVAILABLE_STEP.to_string()],
            instructions,
        }
    }

    pub fn basic_qa() -> Self {
        Self {
            complexity: Complexity::Unrelated,
            steps: vec![BASIC_QA_AGENT.to_string()],
            instructions: BTreeMap::new(),
        }
    }

    pub fn single(complexity: Complexity, agent: impl Into<String>) -> Self {
        Self { complexity, steps: vec![agent.into()], instructions: BTreeMap::new() }
    }

    /// Render as the source's arrow-syntax pipeline string
    /// (`agentA -> agentB -> agentC`), for display/logging only — every
    /// downstream consumer works off the structured `steps`/`instructions`
    /// fields, never this string (DESIGN NOTES).
    pub fn to_arrow_string(&self) -> String {
        self.steps.join(" -> ")
    }

    /// Parse an arrow-syntax pipeline string into steps. Used at the single
    /// boundary where a sub-planner's raw LM output is turned into a `Plan`.
    pub fn parse_steps(arrow_str: &str) -> Vec<String> {
        arrow_str
            .split("->")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether this plan contains no resolvable step at all (spec §4.5:
    /// "If `plan.steps` is empty ... yield a single `plan_not_found` event").
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_round_trip() {
        let plan = Plan::single(Complexity::Basic, "data_viz_agent");
        assert_eq!(plan.to_arrow_string(), "data_viz_agent");

        let steps = Plan::parse_steps("preprocessing_agent -> statistical_analytics_agent -> data_viz_agent");
        assert_eq!(
            steps,
            vec!["preprocessing_agent", "statistical_analytics_agent", "data_viz_agent"]
        );
    }

    #[test]
    fn no_agents_available_is_a_single_sentinel_step() {
        let plan = Plan::no_agents_available("enable at least one agent");
        assert_eq!(plan.steps, vec![NO_AGENTS_AVAILABLE_STEP.to_string()]);
        assert_eq!(plan.complexity, Complexity::NoAgentsAvailable);
    }

    #[test]
    fn parse_steps_trims_whitespace() {
        let steps = Plan::parse_steps("  a  ->b->  c ");
        assert_eq!(steps, vec!["a", "b", "c"]);
    }
}
