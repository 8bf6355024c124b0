//! Vector store abstraction.
//!
//! The [`Store`] trait is the persistence half of the vector index: it
//! keeps embedded records per collection and answers nearest-neighbour
//! queries. Embedding happens one layer up, so a store never talks to a
//! model provider.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

/// A record ready to be written to the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub id: String,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    pub embedding: Vec<f32>,
}

impl IndexRecord {
    /// The `source` metadata entry, if any.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").map(String::as_str)
    }
}

/// A stored text with its similarity to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredText {
    pub id: String,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    pub score: f32,
}

/// Abstract storage backend for the vector index.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert`](Store::upsert) | Insert or overwrite records by id |
/// | [`nearest`](Store::nearest) | Top-k records by cosine similarity |
/// | [`count`](Store::count) | Number of records, optionally per source |
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert records, overwriting any existing record with the same id.
    async fn upsert(&self, collection: &str, records: &[IndexRecord]) -> Result<()>;

    /// Return up to `k` records ordered by decreasing similarity.
    async fn nearest(&self, collection: &str, query: &[f32], k: usize) -> Result<Vec<ScoredText>>;

    /// Count records in a collection, optionally restricted to one source file.
    async fn count(&self, collection: &str, source: Option<&str>) -> Result<usize>;
}

/// Sort by score descending (ties by id for determinism) and keep `k`.
pub fn rank(mut scored: Vec<ScoredText>, k: usize) -> Vec<ScoredText> {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    scored.truncate(k);
    scored
}
