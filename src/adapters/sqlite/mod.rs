pub mod connection;
pub mod deep_analysis_repository;
pub mod migrations;
pub mod preference_repository;
pub mod template_repository;
pub mod usage_repository;

pub use deep_analysis_repository::SqliteDeepAnalysisRepository;
pub use preference_repository::SqlitePreferenceRepository;
pub use template_repository::SqliteTemplateRepository;
pub use usage_repository::SqliteUsageRepository;
