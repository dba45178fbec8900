//! Agent template and signature models.
//!
//! A template is the stored definition of an agent (name, prompt, category,
//! variant); a signature is derived from a template plus the mode it is
//! loaded under (individual vs. planner) and describes the fields an
//! invocation must populate.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category a template is filed under. Visualization category drives the
/// `styling_index` input rule in §4.1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCategory {
    DataManipulation,
    DataModelling,
    DataVisualization,
    Other(String),
}

impl AgentCategory {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().replace('_', " ").as_str() {
            "data manipulation" => Self::DataManipulation,
            "data modelling" | "data modeling" => Self::DataModelling,
            "data visualization" => Self::DataVisualization,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_visualization(&self) -> bool {
        matches!(self, Self::DataVisualization)
    }
}

/// Whether a template is usable via `@agent` mode, composable in plans, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentVariant {
    Individual,
    Planner,
    Both,
}

impl AgentVariant {
    pub fn usable_individually(&self) -> bool {
        matches!(self, Self::Individual | Self::Both)
    }

    pub fn usable_in_planner(&self) -> bool {
        matches!(self, Self::Planner | Self::Both)
    }
}

/// The four agents enabled by default for every user (spec §3, §4.1).
pub const CORE_AGENT_NAMES: &[&str] = &[
    "preprocessing_agent",
    "statistical_analytics_agent",
    "sk_learn_agent",
    "data_viz_agent",
];

/// The `planner_` prefixed counterparts loaded for the planner view.
pub const CORE_PLANNER_AGENT_NAMES: &[&str] = &[
    "planner_preprocessing_agent",
    "planner_statistical_analytics_agent",
    "planner_sk_learn_agent",
    "planner_data_viz_agent",
];

/// Name of the sentinel agent used when a query is classified `unrelated`.
pub const BASIC_QA_AGENT: &str = "basic_qa_agent";

/// Stored definition of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTemplate {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub prompt_template: String,
    pub category: Option<AgentCategory>,
    pub variant: AgentVariant,
    pub base_agent: Option<String>,
    pub premium: bool,
    pub active: bool,
    pub icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentTemplate {
    pub fn new(name: impl Into<String>, variant: AgentVariant) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            prompt_template: String::new(),
            category: None,
            variant,
            base_agent: None,
            premium: false,
            active: true,
            icon_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_prompt(mut self, prompt_template: impl Into<String>) -> Self {
        self.prompt_template = prompt_template.into();
        self
    }

    pub fn with_category(mut self, category: AgentCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_base_agent(mut self, base_agent: impl Into<String>) -> Self {
        self.base_agent = Some(base_agent.into());
        self
    }

    pub fn premium(mut self) -> Self {
        self.premium = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether this template's category or name-substring heuristic marks it
    /// as a visualization agent (spec §4.1's fallback rule).
    pub fn is_visualization(&self) -> bool {
        if let Some(category) = &self.category {
            return category.is_visualization();
        }
        const VIZ_SUBSTRINGS: &[&str] = &["viz", "visual", "plot", "chart", "matplotlib"];
        let lower = self.name.to_lowercase();
        VIZ_SUBSTRINGS.iter().any(|s| lower.contains(s))
    }

    /// Whether `name` is one of the four default-enabled core agents, in
    /// either its individual or `planner_`-prefixed form.
    pub fn is_core(name: &str) -> bool {
        CORE_AGENT_NAMES.contains(&name) || CORE_PLANNER_AGENT_NAMES.contains(&name)
    }

    /// Derive the invocation signature for this template under a given mode.
    pub fn signature(&self, mode: SignatureMode) -> AgentSignature {
        let mut inputs = BTreeSet::new();
        inputs.insert(FieldName::Goal);
        inputs.insert(FieldName::Dataset);
        if self.is_visualization() {
            inputs.insert(FieldName::StylingIndex);
        }
        match mode {
            SignatureMode::Individual => {
                // Individual mode always includes plan_instructions (defaulted
                // to empty) so the same wiring code works uniformly across
                // both AI systems (spec §4.1).
                inputs.insert(FieldName::PlanInstructions);
            }
            SignatureMode::Planner => {
                if self.variant.usable_in_planner() {
                    inputs.insert(FieldName::PlanInstructions);
                }
            }
        }

        let mut outputs = BTreeSet::new();
        if self.name == BASIC_QA_AGENT {
            outputs.insert(FieldName::Answer);
        } else {
            outputs.insert(FieldName::Code);
            outputs.insert(FieldName::Summary);
        }

        AgentSignature { inputs, outputs }
    }
}

/// Which mode a signature is being derived for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMode {
    Individual,
    Planner,
}

/// A field an agent invocation reads from or writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Goal,
    Dataset,
    StylingIndex,
    PlanInstructions,
    Code,
    Summary,
    Answer,
}

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Dataset => "dataset",
            Self::StylingIndex => "styling_index",
            Self::PlanInstructions => "plan_instructions",
            Self::Code => "code",
            Self::Summary => "summary",
            Self::Answer => "answer",
        }
    }
}

/// The derived set of input/output fields an agent invocation must populate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSignature {
    pub inputs: BTreeSet<FieldName>,
    pub outputs: BTreeSet<FieldName>,
}
