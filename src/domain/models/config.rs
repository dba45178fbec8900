//! Top-level orchestrator configuration, loaded hierarchically by
//! [`crate::infrastructure::config::ConfigLoader`].

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrchestratorConfig {
    /// Maximum number of templates surfaced to the planner per user (spec §4.1).
    #[serde(default = "default_max_planner_templates")]
    pub max_planner_templates: usize,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,
}

const fn default_max_planner_templates() -> usize {
    10
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_planner_templates: default_max_planner_templates(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            retry: RetryConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

/// `SQLite` connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    "autoanalyst.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_database_path(), max_connections: default_max_connections() }
    }
}

/// Structured logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Retry/backoff policy applied to LM adapter calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    15_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Per-provider base URL / API key env var name (spec §4.2's provider table).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub api_key_env: String,
}

/// LM provider endpoint table, keyed by provider name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_openai_endpoint")]
    pub openai: ProviderEndpoint,

    #[serde(default = "default_anthropic_endpoint")]
    pub anthropic: ProviderEndpoint,

    #[serde(default = "default_groq_endpoint")]
    pub groq: ProviderEndpoint,

    #[serde(default = "default_gemini_endpoint")]
    pub gemini: ProviderEndpoint,
}

fn default_openai_endpoint() -> ProviderEndpoint {
    ProviderEndpoint {
        base_url: "https://api.openai.com/v1".to_string(),
        api_key_env: "OPENAI_API_KEY".to_string(),
    }
}

fn default_anthropic_endpoint() -> ProviderEndpoint {
    ProviderEndpoint {
        base_url: "https://api.anthropic.com/v1".to_string(),
        api_key_env: "ANTHROPIC_API_KEY".to_string(),
    }
}

fn default_groq_endpoint() -> ProviderEndpoint {
    ProviderEndpoint {
        base_url: "https://api.groq.com/openai/v1".to_string(),
        api_key_env: "GROQ_API_KEY".to_string(),
    }
}

fn default_gemini_endpoint() -> ProviderEndpoint {
    ProviderEndpoint {
        base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        api_key_env: "GEMINI_API_KEY".to_string(),
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: default_openai_endpoint(),
            anthropic: default_anthropic_endpoint(),
            groq: default_groq_endpoint(),
            gemini: default_gemini_endpoint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_planner_templates, 10);
        assert_eq!(config.database.path, "autoanalyst.db");
        assert_eq!(config.logging.level, "info");
        assert!(config.retry.initial_backoff_ms < config.retry.max_backoff_ms);
    }

    #[test]
    fn yaml_overrides_merge_over_defaults() {
        let yaml = r"
max_planner_templates: 5
logging:
  level: debug
";
        let config: OrchestratorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_planner_templates, 5);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.database.path, "autoanalyst.db");
    }
}
