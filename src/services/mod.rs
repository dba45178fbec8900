pub mod agent_registry;
pub mod ai_system_individual;
pub mod ai_system_planned;
pub mod deep_analyzer;
pub(crate) mod lm_timeout;
pub mod planner;
pub mod session_manager;
pub mod streaming;
pub mod usage_tracker;

pub use agent_registry::AgentRegistry;
pub use ai_system_individual::{AgentOutput, AiSystemIndividual};
pub use ai_system_planned::AiSystemPlanned;
pub use deep_analyzer::{DeepAnalysisEvent, DeepAnalyzer};
pub use planner::Planner;
pub use session_manager::SessionManager;
pub use usage_tracker::UsageTracker;
