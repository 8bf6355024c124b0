//! In-memory [`Store`] implementation for tests.
//!
//! Uses a `HashMap` per collection behind `std::sync::RwLock`. Search is
//! brute-force cosine similarity over every stored vector.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::{rank, IndexRecord, ScoredText, Store};
use crate::embedding::cosine_similarity;

type Collection = HashMap<String, IndexRecord>;

/// In-memory vector store.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl Store for InMemoryStore {
    async fn upsert(&self, collection: &str, records: &[IndexRecord]) -> Result<()> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let entries = collections.entry(collection.to_string()).or_default();
        for record in records {
            entries.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn nearest(&self, collection: &str, query: &[f32], k: usize) -> Result<Vec<ScoredText>> {
        let collections = self.collections.read().map_err(poisoned)?;
        let Some(entries) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let scored = entries
            .values()
            .map(|r| ScoredText {
                id: r.id.clone(),
                text: r.text.clone(),
                metadata: r.metadata.clone(),
                score: cosine_similarity(query, &r.embedding),
            })
            .collect();
        Ok(rank(scored, k))
    }

    async fn count(&self, collection: &str, source: Option<&str>) -> Result<usize> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .get(collection)
            .map(|entries| {
                entries
                    .values()
                    .filter(|r| source.is_none() || r.source() == source)
                    .count()
            })
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(id: &str, source: &str, embedding: Vec<f32>) -> IndexRecord {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), source.to_string());
        IndexRecord {
            id: id.to_string(),
            text: format!("text of {}", id),
            metadata,
            embedding,
        }
    }

    #[tokio::test]
    async fn empty_collection_returns_nothing() {
        let store = InMemoryStore::new();
        let hits = store.nearest("docs", &[1.0, 0.0], 4).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(store.count("docs", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn nearest_orders_by_similarity() {
        let store = InMemoryStore::new();
        store
            .upsert(
                "docs",
                &[
                    record("a", "x.pdf", vec![1.0, 0.0]),
                    record("b", "x.pdf", vec![0.7, 0.7]),
                    record("c", "y.pdf", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();

        let hits = store.nearest("docs", &[1.0, 0.1], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[1].id, "b");
    }

    #[tokio::test]
    async fn upsert_overwrites_by_id() {
        let store = InMemoryStore::new();
        store
            .upsert("docs", &[record("a", "x.pdf", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert("docs", &[record("a", "x.pdf", vec![0.0, 1.0])])
            .await
            .unwrap();
        assert_eq!(store.count("docs", Some("x.pdf")).await.unwrap(), 1);
        assert_eq!(store.count("docs", Some("y.pdf")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = InMemoryStore::new();
        store
            .upsert("one", &[record("a", "x.pdf", vec![1.0])])
            .await
            .unwrap();
        assert_eq!(store.count("two", None).await.unwrap(), 0);
        assert!(store.nearest("two", &[1.0], 3).await.unwrap().is_empty());
    }
}
