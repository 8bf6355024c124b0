//! Question-time retrieval.

use std::sync::Arc;

use crate::index::VectorIndex;

/// Fetches the chunk texts most relevant to a question.
pub struct Retriever {
    index: Arc<VectorIndex>,
    top_k: usize,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>, top_k: usize) -> Self {
        Self { index, top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Up to `top_k` chunk texts, most similar first.
    ///
    /// Never fails: an empty index or a failed query yields no texts.
    pub async fn retrieve(&self, question: &str) -> Vec<String> {
        self.retrieve_k(question, self.top_k).await
    }

    /// [`Retriever::retrieve`] with an explicit `k`.
    pub async fn retrieve_k(&self, question: &str, k: usize) -> Vec<String> {
        match self.index.query(question, k).await {
            Ok(texts) => {
                tracing::debug!(k, hits = texts.len(), "retrieved context");
                texts
            }
            Err(e) => {
                tracing::warn!(error = %e, "retrieval failed, continuing without context");
                Vec::new()
            }
        }
    }
}
