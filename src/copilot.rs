//! Application context.
//!
//! [`Copilot`] is built once per process from the [`Config`] and
//! [`Secrets`] and owns every component. Commands borrow it instead of
//! reaching for globals.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::NaiveDate;

use onboarding_core::embedding::EmbeddingProvider;
use onboarding_core::generation::GenerativeModel;
use onboarding_core::models::TaskRecord;
use onboarding_core::store::Store;
use onboarding_core::COLLECTION_NAME;

use crate::answer::{Answer, AnswerGenerator};
use crate::config::{Config, Secrets};
use crate::embedding::create_provider;
use crate::index::VectorIndex;
use crate::ingest::{IngestReport, Ingestor};
use crate::llm::create_model;
use crate::logger::CsvLogger;
use crate::planner::PlanGenerator;
use crate::retrieve::Retriever;
use crate::sqlite_store::SqliteStore;

/// Category recorded for chat interactions.
pub const CHAT_CATEGORY: &str = "onboarding";
pub const ANONYMOUS_USER: &str = "anonymous";
pub const UNKNOWN_ROLE: &str = "unknown";

pub struct Copilot {
    config: Config,
    index: Arc<VectorIndex>,
    answers: AnswerGenerator,
    planner: PlanGenerator,
    logger: CsvLogger,
}

impl Copilot {
    /// Build the production stack: SQLite index plus the configured providers.
    pub async fn open(config: Config, secrets: &Secrets) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::from(create_provider(&config.embedding, secrets)?);
        let model: Arc<dyn GenerativeModel> =
            Arc::from(create_model(&config.generation, secrets)?);
        let store = SqliteStore::open(&config)
            .await?
            .with_model(embedder.model_name());

        tracing::debug!(
            embedding = embedder.model_name(),
            generation = model.model_name(),
            index = %config.index.db_path().display(),
            "copilot ready"
        );

        Ok(Self::from_parts(config, Arc::new(store), embedder, model))
    }

    /// Assemble from explicit parts. Used by tests with fake providers.
    pub fn from_parts(
        config: Config,
        store: Arc<dyn Store>,
        embedder: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        let index = Arc::new(VectorIndex::new(
            store,
            embedder,
            COLLECTION_NAME,
            config.embedding.batch_size,
        ));
        let retriever = Retriever::new(Arc::clone(&index), config.retrieval.top_k);
        let temperature = config.generation.temperature;
        let answers = AnswerGenerator::new(retriever, Arc::clone(&model), temperature);
        let planner = PlanGenerator::new(model, temperature);
        let logger = CsvLogger::from_config(&config.logs);

        Self {
            config,
            index,
            answers,
            planner,
            logger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn retriever(&self) -> &Retriever {
        self.answers.retriever()
    }

    pub fn logger(&self) -> &CsvLogger {
        &self.logger
    }

    /// Ingest the PDFs in `dir` (default: `ingest.data_dir`).
    pub async fn ingest(&self, dir: Option<&Path>) -> Result<IngestReport> {
        let dir = dir.unwrap_or(self.config.ingest.data_dir.as_path());
        Ingestor::new(Arc::clone(&self.index), self.config.ingest.clone())
            .ingest(dir)
            .await
    }

    /// Answer a question. The exchange is logged only when a user name or
    /// role is given.
    pub async fn ask(&self, question: &str, user_name: Option<&str>, role: Option<&str>) -> Answer {
        let answer = self.answers.answer(question).await;

        let user_name = user_name.filter(|s| !s.trim().is_empty());
        let role = role.filter(|s| !s.trim().is_empty());
        if user_name.is_some() || role.is_some() {
            if let Err(e) = self.logger.log_interaction(
                user_name.unwrap_or(ANONYMOUS_USER),
                role.unwrap_or(UNKNOWN_ROLE),
                question,
                &answer.text,
                CHAT_CATEGORY,
            ) {
                tracing::warn!(error = %e, "failed to log interaction");
            }
        }

        answer
    }

    /// Generate a plan and log it when it is not empty.
    pub async fn plan(
        &self,
        user_name: &str,
        role: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<TaskRecord>> {
        if user_name.trim().is_empty() || role.trim().is_empty() {
            bail!("name and role are required to generate a plan");
        }

        let tasks = self
            .planner
            .generate_plan(user_name, role, start_date)
            .await;

        if !tasks.is_empty() {
            if let Err(e) = self.logger.log_tasks(user_name, role, start_date, &tasks) {
                tracing::warn!(error = %e, "failed to log plan");
            }
        }

        Ok(tasks)
    }
}
