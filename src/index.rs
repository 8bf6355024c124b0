//! The vector index boundary.
//!
//! [`VectorIndex`] pairs an [`EmbeddingProvider`] with a [`Store`] and
//! exposes the text-in, text-out operations the rest of the app uses.
//! Callers never see vectors or know which backend is behind it.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Result};

use onboarding_core::embedding::{embed_one, EmbeddingProvider};
use onboarding_core::store::{IndexRecord, ScoredText, Store};

/// A named collection in a vector store, embedded by one provider.
pub struct VectorIndex {
    store: Arc<dyn Store>,
    embedder: Arc<dyn EmbeddingProvider>,
    collection: String,
    batch_size: usize,
}

impl VectorIndex {
    pub fn new(
        store: Arc<dyn Store>,
        embedder: Arc<dyn EmbeddingProvider>,
        collection: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            collection: collection.into(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Embed `texts` and store them under `ids`, overwriting existing ids.
    ///
    /// The three slices are parallel and must have the same length. Texts
    /// are embedded in `batch_size` batches, and nothing is written unless
    /// every batch succeeds.
    pub async fn upsert(
        &self,
        ids: &[String],
        texts: &[String],
        metadatas: &[BTreeMap<String, String>],
    ) -> Result<()> {
        if ids.len() != texts.len() || ids.len() != metadatas.len() {
            bail!(
                "upsert length mismatch: {} ids, {} texts, {} metadatas",
                ids.len(),
                texts.len(),
                metadatas.len()
            );
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self.embedder.embed(batch).await?;
            if vectors.len() != batch.len() {
                bail!(
                    "embedding provider returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                );
            }
            embeddings.extend(vectors);
        }

        let records: Vec<IndexRecord> = embeddings
            .into_iter()
            .enumerate()
            .map(|(i, embedding)| IndexRecord {
                id: ids[i].clone(),
                text: texts[i].clone(),
                metadata: metadatas[i].clone(),
                embedding,
            })
            .collect();

        self.store.upsert(&self.collection, &records).await?;
        tracing::debug!(
            collection = %self.collection,
            records = records.len(),
            "upserted records"
        );

        Ok(())
    }

    /// The `k` stored texts most similar to `text`, best first.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .query_scored(text, k)
            .await?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Like [`VectorIndex::query`] but keeps ids, metadata, and scores.
    pub async fn query_scored(&self, text: &str, k: usize) -> Result<Vec<ScoredText>> {
        if k == 0 || self.count(None).await? == 0 {
            return Ok(Vec::new());
        }
        let query = embed_one(self.embedder.as_ref(), text).await?;
        self.store.nearest(&self.collection, &query, k).await
    }

    /// Number of stored chunks, optionally for one source file.
    pub async fn count(&self, source: Option<&str>) -> Result<usize> {
        self.store.count(&self.collection, source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use onboarding_core::store::memory::InMemoryStore;

    /// Succeeds for the first `ok_calls` calls, then fails.
    struct FlakyEmbedder {
        ok_calls: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyEmbedder {
        fn model_name(&self) -> &str {
            "flaky"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) >= self.ok_calls {
                bail!("embedding service unavailable");
            }
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
    }

    fn index(ok_calls: usize, batch_size: usize) -> VectorIndex {
        let embedder = FlakyEmbedder {
            ok_calls,
            calls: AtomicUsize::new(0),
        };
        VectorIndex::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(embedder),
            "docs",
            batch_size,
        )
    }

    fn parallel(n: usize) -> (Vec<String>, Vec<String>, Vec<BTreeMap<String, String>>) {
        let ids = (0..n).map(|i| format!("c{}", i)).collect();
        let texts = (0..n).map(|i| "x".repeat(i + 1)).collect();
        let metas = (0..n).map(|_| BTreeMap::new()).collect();
        (ids, texts, metas)
    }

    #[tokio::test]
    async fn failed_later_batch_writes_nothing() {
        let index = index(1, 1);
        let (ids, texts, metas) = parallel(3);

        assert!(index.upsert(&ids, &texts, &metas).await.is_err());
        assert_eq!(index.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn all_batches_are_stored_together() {
        let index = index(usize::MAX, 2);
        let (ids, texts, metas) = parallel(5);

        index.upsert(&ids, &texts, &metas).await.unwrap();
        assert_eq!(index.count(None).await.unwrap(), 5);
        let top = index.query("xxxxx", 1).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn mismatched_lengths_are_rejected() {
        let index = index(usize::MAX, 4);
        let (ids, texts, _) = parallel(2);
        assert!(index.upsert(&ids, &texts, &[]).await.is_err());
    }
}
