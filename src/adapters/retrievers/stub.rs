//! Stub retriever: returns chunks from a fixed in-memory corpus, substring
//! matched against the query. Placeholder for a real vector-backed
//! retriever (spec §4.2 Non-goals: embedding/indexing infrastructure is
//! explicitly out of scope for this core).

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::ports::retriever::{RetrievedChunk, Retriever};

pub struct StubRetriever {
    corpus: Vec<RetrievedChunk>,
}

impl StubRetriever {
    pub fn new(corpus: Vec<RetrievedChunk>) -> Self {
        Self { corpus }
    }

    pub fn empty() -> Self {
        Self { corpus: Vec::new() }
    }
}

#[async_trait]
impl Retriever for StubRetriever {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> DomainResult<Vec<RetrievedChunk>> {
        let query_lower = query.to_lowercase();
        Ok(self
            .corpus
            .iter()
            .filter(|chunk| chunk.text.to_lowercase().contains(&query_lower))
            .take(top_k)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn filters_by_substring_and_respects_top_k() {
        let retriever = StubRetriever::new(vec![
            RetrievedChunk { source: "a".to_string(), text: "housing prices rose".to_string() },
            RetrievedChunk { source: "b".to_string(), text: "unrelated note".to_string() },
            RetrievedChunk { source: "c".to_string(), text: "housing supply fell".to_string() },
        ]);
        let results = retriever.retrieve("housing", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "a");
    }

    #[tokio::test]
    async fn empty_corpus_returns_no_matches() {
        let retriever = StubRetriever::empty();
        let results = retriever.retrieve("anything", 5).await.unwrap();
        assert!(results.is_empty());
    }
}
