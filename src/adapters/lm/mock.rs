//! In-memory LM adapter for tests and the offline demo path, mirroring the
//! teacher's `MockSubstrate`.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::DomainResult;
use crate::domain::ports::lm_adapter::{CompletionRequest, CompletionResponse, CompletionUsage, LmAdapter};

/// Returns a fixed, configurable response for every call and records the
/// prompts it was asked to complete, so tests can assert on them.
pub struct MockLmAdapter {
    response_text: String,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl MockLmAdapter {
    pub fn new(response_text: impl Into<String>) -> Self {
        Self { response_text: response_text.into(), calls: Mutex::new(Vec::new()) }
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl LmAdapter for MockLmAdapter {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> DomainResult<CompletionResponse> {
        let usage = CompletionUsage {
            prompt_tokens: crate::services::usage_tracker::estimate_tokens(&request.user_prompt),
            completion_tokens: crate::services::usage_tracker::estimate_tokens(&self.response_text),
        };
        self.calls.lock().await.push(request);
        Ok(CompletionResponse { text: self.response_text.clone(), usage })
    }
}
