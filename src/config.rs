//! Configuration parsing and validation.
//!
//! Configuration is loaded once from a TOML file (default
//! `./config/onboard.toml`) and passed by reference into every component
//! constructor. Every section is optional and falls back to the defaults
//! below, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```toml
//! [index]
//! dir = "./chroma_db"
//!
//! [ingest]
//! data_dir = "./data"
//! chunk_size = 800
//! chunk_overlap = 150
//! granularity = "page"
//!
//! [retrieval]
//! top_k = 4
//!
//! [embedding]
//! provider = "gemini"
//! model = "text-embedding-004"
//! dims = 768
//!
//! [generation]
//! provider = "gemini"
//! model = "gemini-2.5-flash"
//! temperature = 0.0
//!
//! [logs]
//! dir = "./logs"
//! ```
//!
//! API keys never live in the file; see [`Secrets`].

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Path used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/onboard.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Directory holding the persisted index.
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
        }
    }
}

impl IndexConfig {
    pub fn db_path(&self) -> PathBuf {
        self.dir.join("index.sqlite")
    }
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./chroma_db")
}

/// Whether each PDF page is chunked on its own or the pages of a file are
/// joined first.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Page,
    Document,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default)]
    pub granularity: Granularity,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            granularity: Granularity::Page,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_chunk_size() -> usize {
    onboarding_core::chunk::DEFAULT_CHUNK_SIZE
}
fn default_chunk_overlap() -> usize {
    onboarding_core::chunk::DEFAULT_CHUNK_OVERLAP
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL override (Ollama, or a proxy in front of a hosted API).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_embedding_retries")]
    pub max_retries: u32,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_batch_size(),
            max_retries: default_embedding_retries(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

fn default_embedding_provider() -> String {
    "gemini".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_embedding_retries() -> u32 {
    5
}
fn default_embedding_timeout() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    /// Model name, falling back to the provider's usual default.
    pub fn model_or_default(&self) -> Option<String> {
        self.model.clone().or_else(|| {
            match self.provider.as_str() {
                "gemini" => Some("text-embedding-004"),
                "openai" => Some("text-embedding-3-small"),
                "ollama" => Some("nomic-embed-text"),
                "local" => Some("all-minilm-l6-v2"),
                _ => None,
            }
            .map(str::to_string)
        })
    }

    /// Vector width, falling back to the provider's usual default.
    pub fn dims_or_default(&self) -> Option<usize> {
        self.dims.or(match self.provider.as_str() {
            "gemini" => Some(768),
            "openai" => Some(1536),
            "ollama" => Some(768),
            "local" => Some(384),
            _ => None,
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_provider")]
    pub provider: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_generation_retries")]
    pub max_retries: u32,
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            model: default_generation_model(),
            temperature: 0.0,
            url: None,
            max_retries: default_generation_retries(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

fn default_generation_provider() -> String {
    "gemini".to_string()
}
fn default_generation_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_generation_retries() -> u32 {
    2
}
fn default_generation_timeout() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogsConfig {
    #[serde(default = "default_logs_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_interactions_file")]
    pub interactions_file: String,
    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            dir: default_logs_dir(),
            interactions_file: default_interactions_file(),
            tasks_file: default_tasks_file(),
        }
    }
}

impl LogsConfig {
    pub fn interactions_path(&self) -> PathBuf {
        self.dir.join(&self.interactions_file)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.dir.join(&self.tasks_file)
    }
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("./logs")
}
fn default_interactions_file() -> String {
    "interactions.csv".to_string()
}
fn default_tasks_file() -> String {
    "tasks.csv".to_string()
}

/// Load and validate the configuration file at `path`.
///
/// A missing file at [`DEFAULT_CONFIG_PATH`] yields [`Config::default`];
/// a missing file anywhere else is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate ingestion
    if config.ingest.chunk_size == 0 {
        bail!("ingest.chunk_size must be > 0");
    }
    if config.ingest.chunk_overlap >= config.ingest.chunk_size {
        bail!(
            "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
            config.ingest.chunk_overlap,
            config.ingest.chunk_size
        );
    }

    // Validate retrieval
    if config.retrieval.top_k < 1 {
        bail!("retrieval.top_k must be >= 1");
    }

    // Validate embedding
    match config.embedding.provider.as_str() {
        "disabled" | "gemini" | "openai" | "ollama" | "local" => {}
        other => bail!(
            "Unknown embedding provider: '{}'. Must be disabled, gemini, openai, ollama, or local.",
            other
        ),
    }
    if config.embedding.is_enabled() {
        if config.embedding.dims_or_default() == Some(0) {
            bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.batch_size == 0 {
            bail!("embedding.batch_size must be > 0");
        }
    }

    // Validate generation
    match config.generation.provider.as_str() {
        "gemini" | "openai" | "ollama" => {}
        other => bail!(
            "Unknown generation provider: '{}'. Must be gemini, openai, or ollama.",
            other
        ),
    }
    if !(0.0..=2.0).contains(&config.generation.temperature) {
        bail!("generation.temperature must be in [0.0, 2.0]");
    }

    Ok(())
}

/// API keys, read from the environment exactly once at startup.
#[derive(Clone, Default)]
pub struct Secrets {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "***"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Secrets {
    /// Read the keys the configured providers need.
    ///
    /// Fails when a configured provider needs a key that is not set, naming
    /// the missing variable.
    pub fn from_env(config: &Config) -> Result<Self> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Like [`Secrets::from_env`] with an injectable variable lookup.
    pub fn from_lookup(config: &Config, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let gemini_api_key = read("GEMINI_API_KEY").or_else(|| read("GOOGLE_API_KEY"));
        let openai_api_key = read("OPENAI_API_KEY");

        let providers = [
            config.embedding.provider.as_str(),
            config.generation.provider.as_str(),
        ];
        if providers.contains(&"gemini") && gemini_api_key.is_none() {
            bail!("GEMINI_API_KEY environment variable not set (GOOGLE_API_KEY is also accepted)");
        }
        if providers.contains(&"openai") && openai_api_key.is_none() {
            bail!("OPENAI_API_KEY environment variable not set");
        }

        Ok(Self {
            gemini_api_key,
            openai_api_key,
        })
    }
}
