pub mod deep_analysis_repository;
pub mod lm_adapter;
pub mod preference_repository;
pub mod retriever;
pub mod template_repository;
pub mod usage_repository;

pub use deep_analysis_repository::DeepAnalysisRepository;
pub use lm_adapter::{CompletionRequest, CompletionResponse, CompletionUsage, LmAdapter};
pub use preference_repository::PreferenceRepository;
pub use retriever::{Retriever, RetrievedChunk};
pub use template_repository::TemplateRepository;
pub use usage_repository::UsageRepository;
