//! Port for the language model adapter (spec §4.2's "LM Adapter" module).

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::LmContext;

/// A single completion request sent to an LM provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub context: LmContext,
}

/// Usage metadata returned alongside a completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Text plus token accounting from one LM call.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: CompletionUsage,
}

/// Provider-agnostic interface agents call through; implementations route by
/// [`crate::domain::models::Provider`] (spec §4.2: openai/anthropic/groq/gemini).
#[async_trait]
pub trait LmAdapter: Send + Sync {
    /// Identifies which `Provider` this adapter serves, for registry lookup.
    fn provider_name(&self) -> &'static str;

    async fn complete(&self, request: CompletionRequest) -> DomainResult<CompletionResponse>;
}
