//! # Onboarding Copilot
//!
//! A document-grounded assistant for new hires. PDFs from a data directory
//! are chunked, embedded, and stored in a local vector index; questions are
//! answered by a language model that only sees the retrieved passages; and
//! a ten-day onboarding plan can be generated and parsed into tasks. Both
//! exchanges and plans are appended to CSV logs for later analytics.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐
//! │  PDFs    │──▶│   Ingestor   │──▶│ VectorIndex  │
//! │ data/    │   │ extract+chunk│   │ SQLite+embed │
//! └──────────┘   └──────────────┘   └──────┬───────┘
//!                                          │ top-k
//!                  question ──▶ Retriever ◀┘
//!                                   │
//!                                   ▼
//!                           AnswerGenerator ──▶ answer ──▶ CsvLogger
//!
//!  (name, role, start) ──▶ PlanGenerator ──▶ tasks ──▶ CsvLogger
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! onboard init
//! onboard ingest                        # reads ./data/*.pdf
//! onboard ask "Which forms do I sign on day one?" --name Ada --role Engineer
//! onboard plan --name Ada --role "Backend Developer" --start 2024-01-08
//! onboard stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and API keys |
//! | [`extract`] | Per-page PDF text extraction |
//! | [`ingest`] | Directory ingestion into the index |
//! | [`embedding`] | Embedding providers |
//! | [`llm`] | Text-generation providers |
//! | [`sqlite_store`] | SQLite vector store |
//! | [`index`] | The vector index boundary |
//! | [`retrieve`] | Question-time retrieval |
//! | [`answer`] | Grounded answers |
//! | [`planner`] | Onboarding plans |
//! | [`logger`] | CSV interaction and task logs |
//! | [`analytics`] | Log summaries |
//! | [`copilot`] | Application context |

pub mod analytics;
pub mod answer;
pub mod commands;
pub mod config;
pub mod copilot;
pub mod embedding;
pub mod extract;
pub mod http;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod logger;
pub mod planner;
pub mod retrieve;
pub mod sqlite_store;

pub use onboarding_core::COLLECTION_NAME;
