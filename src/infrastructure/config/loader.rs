//! Hierarchical configuration loading, grounded on the teacher's
//! figment-based `ConfigLoader`: programmatic defaults, then a project YAML
//! file, then environment variables, highest priority last.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::OrchestratorConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid max_planner_templates: {0}. Must be between 1 and 100")]
    InvalidMaxPlannerTemplates(usize),

    #[error("invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("database path cannot be empty")]
    EmptyDatabasePath,

    #[error("invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error("invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})")]
    InvalidBackoff(u64, u64),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `autoanalyst.yaml` in the working directory
    /// 3. Environment variables (`AUTOANALYST_` prefix)
    pub fn load() -> Result<OrchestratorConfig> {
        let config: OrchestratorConfig = Figment::new()
            .merge(Serialized::defaults(OrchestratorConfig::default()))
            .merge(Yaml::file("autoanalyst.yaml"))
            .merge(Env::prefixed("AUTOANALYST_").split("__"))
            .extract()
            .context("failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<OrchestratorConfig> {
        let config: OrchestratorConfig = Figment::new()
            .merge(Serialized::defaults(OrchestratorConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &OrchestratorConfig) -> Result<(), ConfigError> {
        if config.max_planner_templates == 0 || config.max_planner_templates > 100 {
            return Err(ConfigError::InvalidMaxPlannerTemplates(config.max_planner_templates));
        }

        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.retry.max_retries));
        }
        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(config.retry.initial_backoff_ms, config.retry.max_backoff_ms));
        }

        Ok(())
    }
}
