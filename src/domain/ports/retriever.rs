//! Port for the retriever set (spec §4.2's "Retriever Set" module): the
//! pluggable sources an agent prompt may be augmented with (dataset samples,
//! prior chat history, documentation snippets).

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// One retrieved snippet plus its originating source name, for prompt
/// citation and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedChunk {
    pub source: String,
    pub text: String,
}

#[async_trait]
pub trait Retriever: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch the top-k chunks relevant to `query`. Implementations that find
    /// nothing return an empty vec rather than erroring.
    async fn retrieve(&self, query: &str, top_k: usize) -> DomainResult<Vec<RetrievedChunk>>;
}
