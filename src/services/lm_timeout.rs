//! Shared timeout and cancellation wrapping around `LmAdapter::complete`
//! calls (spec §5: 120s interactive cap, cooperative cancellation).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::lm_adapter::{CompletionRequest, CompletionResponse};
use crate::domain::ports::LmAdapter;

/// Interactive-path LM call cap (spec §5).
pub const INTERACTIVE_TIMEOUT_SECS: u64 = 120;

/// Run one LM completion, racing it against both the interactive timeout
/// and caller-driven cancellation. Cancellation reports as
/// [`DomainError::Timeout`] so agent-containment rules (spec §7) already
/// written against `Timeout` apply uniformly to "ran out of time" and
/// "was cancelled".
pub async fn complete_with_cap(
    lm: &Arc<dyn LmAdapter>,
    request: CompletionRequest,
    cancellation: &CancellationToken,
) -> DomainResult<CompletionResponse> {
    tokio::select! {
        result = tokio::time::timeout(std::time::Duration::from_secs(INTERACTIVE_TIMEOUT_SECS), lm.complete(request)) => {
            match result {
                Ok(inner) => inner,
                Err(_) => Err(DomainError::Timeout(INTERACTIVE_TIMEOUT_SECS)),
            }
        }
        () = cancellation.cancelled() => Err(DomainError::Timeout(INTERACTIVE_TIMEOUT_SECS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::lm::MockLmAdapter;
    use crate::domain::models::LmContext;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "sys".to_string(),
            user_prompt: "hi".to_string(),
            context: LmContext::default(),
        }
    }

    #[tokio::test]
    async fn completes_normally_when_not_cancelled() {
        let lm: Arc<dyn LmAdapter> = Arc::new(MockLmAdapter::new("ok"));
        let cancellation = CancellationToken::new();
        let response = complete_with_cap(&lm, request(), &cancellation).await.unwrap();
        assert_eq!(response.text, "ok");
    }

    #[tokio::test]
    async fn pre_cancelled_token_fails_as_timeout() {
        let lm: Arc<dyn LmAdapter> = Arc::new(MockLmAdapter::new("ok"));
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let err = complete_with_cap(&lm, request(), &cancellation).await.unwrap_err();
        assert!(matches!(err, DomainError::Timeout(_)));
    }
}
