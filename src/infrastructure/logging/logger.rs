//! Tracing subscriber bootstrap, grounded on the teacher's `LoggerImpl`
//! (env-filtered level, json/pretty format switch) with the file-rotation
//! and secret-scrubbing layers dropped — this core has no long-running
//! daemon process that needs log rotation.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::domain::models::config::LoggingConfig;

pub struct LoggerImpl;

impl LoggerImpl {
    /// Initialize the global tracing subscriber. Call once at process start.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let level = parse_log_level(&config.level)?;
        let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

        match config.format.as_str() {
            "pretty" => {
                tracing_subscriber::fmt()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_env_filter(env_filter)
                    .init();
            }
            _ => {
                tracing_subscriber::fmt()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_env_filter(env_filter)
                    .init();
            }
        }

        Ok(Self)
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    level
        .parse::<Level>()
        .map_err(|_| anyhow::anyhow!("invalid log level: {level}. Must be one of: trace, debug, info, warn, error"))
}
