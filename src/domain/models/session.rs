//! Session state and the explicit LM context threaded through agent calls.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dataset::DatasetDescriptor;

/// Supported LM providers (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Groq,
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Groq => "groq",
            Self::Gemini => "gemini",
        }
    }
}

/// Explicit per-session LM configuration, passed through every agent
/// invocation rather than read off an implicit global (DESIGN NOTES,
/// "Session-scoped LM config -> explicit context").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LmContext {
    pub provider: Provider,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl LmContext {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self { provider, model: model.into(), max_tokens: 4096, temperature: 0.7 }
    }
}

impl Default for LmContext {
    fn default() -> Self {
        Self::new(Provider::OpenAi, "gpt-5-mini")
    }
}

/// Per-client context binding a dataset, user, chat, model config, and the
/// cached deep analyzer (spec §3's `Session state`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub user_id: Option<String>,
    pub chat_id: Option<String>,
    pub current_dataset: Option<DatasetDescriptor>,
    pub model_config: LmContext,
    /// `Some` once a deep analyzer has been materialized for this session.
    pub deep_analyzer_user_id: Option<String>,
    pub current_deep_analysis_id: Option<Uuid>,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: None,
            chat_id: None,
            current_dataset: None,
            model_config: LmContext::default(),
            deep_analyzer_user_id: None,
            current_deep_analysis_id: None,
        }
    }

    /// Whether this session has a dataset bound (required for any chat
    /// operation per spec §4.6's invariant).
    pub fn has_dataset(&self) -> bool {
        self.current_dataset.is_some()
    }
}
