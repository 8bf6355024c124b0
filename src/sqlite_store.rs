//! SQLite-backed [`Store`] implementation.
//!
//! Every record lives in the `index_chunks` table, keyed by collection and chunk id.
//! Upserts overwrite by id, so re-ingesting a file rewrites its rows in
//! place. Nearest-neighbour search loads the collection's vectors and
//! ranks them by exact cosine similarity in Rust.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use onboarding_core::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use onboarding_core::store::{rank, IndexRecord, ScoredText, Store};

use crate::config::Config;

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS index_chunks (
        id TEXT NOT NULL,
        collection TEXT NOT NULL,
        source TEXT NOT NULL DEFAULT '',
        text TEXT NOT NULL,
        metadata_json TEXT NOT NULL DEFAULT '{}',
        embedding BLOB NOT NULL,
        model TEXT NOT NULL,
        dims INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (collection, id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_index_chunks_collection ON index_chunks(collection, source)",
];

/// Open (creating if needed) the SQLite file at `db_path` in WAL mode.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create index directory: {}", parent.display())
        })?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    Ok(SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?)
}

/// Create the index table and its lookup index. Safe to run repeatedly.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
    model: String,
}

impl SqliteStore {
    /// Wrap an existing pool. The schema must already exist.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            model: "unknown".to_string(),
        }
    }

    /// Connect to the configured index and ensure the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = connect(&config.index.db_path()).await?;
        ensure_schema(&pool)
            .await
            .context("Failed to create index schema")?;
        Ok(Self::new(pool))
    }

    /// Record `model` as the embedding model of every row written.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn upsert(&self, collection: &str, records: &[IndexRecord]) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for record in records {
            let metadata_json = serde_json::to_string(&record.metadata)?;
            sqlx::query(
                r#"
                INSERT INTO index_chunks (id, collection, source, text, metadata_json,
                                          embedding, model, dims, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(collection, id) DO UPDATE SET
                    source = excluded.source,
                    text = excluded.text,
                    metadata_json = excluded.metadata_json,
                    embedding = excluded.embedding,
                    model = excluded.model,
                    dims = excluded.dims,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(&record.id)
            .bind(collection)
            .bind(record.source().unwrap_or_default())
            .bind(&record.text)
            .bind(&metadata_json)
            .bind(vec_to_blob(&record.embedding))
            .bind(&self.model)
            .bind(record.embedding.len() as i64)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn nearest(&self, collection: &str, query: &[f32], k: usize) -> Result<Vec<ScoredText>> {
        let rows = sqlx::query(
            r#"
            SELECT id, text, metadata_json, embedding
            FROM index_chunks
            WHERE collection = ? AND dims = ?
            "#,
        )
        .bind(collection)
        .bind(query.len() as i64)
        .fetch_all(&self.pool)
        .await?;

        let scored: Vec<ScoredText> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let metadata_json: String = row.get("metadata_json");
                let metadata: BTreeMap<String, String> =
                    serde_json::from_str(&metadata_json).unwrap_or_default();
                ScoredText {
                    id: row.get("id"),
                    text: row.get("text"),
                    metadata,
                    score: cosine_similarity(query, &blob_to_vec(&blob)),
                }
            })
            .collect();

        Ok(rank(scored, k))
    }

    async fn count(&self, collection: &str, source: Option<&str>) -> Result<usize> {
        let n: i64 = match source {
            Some(source) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM index_chunks WHERE collection = ? AND source = ?",
                )
                .bind(collection)
                .bind(source)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM index_chunks WHERE collection = ?")
                    .bind(collection)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(n as usize)
    }
}
