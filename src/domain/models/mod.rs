pub mod agent_template;
pub mod config;
pub mod dataset;
pub mod deep_analysis;
pub mod execution;
pub mod plan;
pub mod preference;
pub mod session;
pub mod usage;

pub use agent_template::{
    AgentCategory, AgentSignature, AgentTemplate, AgentVariant, FieldName, SignatureMode,
    BASIC_QA_AGENT, CORE_AGENT_NAMES, CORE_PLANNER_AGENT_NAMES,
};
pub use config::OrchestratorConfig;
pub use dataset::{ColumnSchema, DatasetDescriptor, SemanticType};
pub use deep_analysis::{DeepAnalysisReport, DeepAnalysisStatus, StageOutput, DEEP_ANALYSIS_STAGES};
pub use execution::{EventOutcome, EventStatus, ExecutionEvent};
pub use plan::{Complexity, Plan, StepInstruction, NO_AGENTS_AVAILABLE_STEP};
pub use preference::UserTemplatePreference;
pub use session::{LmContext, Provider, SessionState};
pub use usage::{CreditTier, UsageRecord, UsageSummary};
