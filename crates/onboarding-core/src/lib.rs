//! # Onboarding Copilot Core
//!
//! Pure logic shared by the onboarding copilot: data models, the
//! sliding-window chunker, prompt builders, the onboarding plan parser,
//! and the traits that sit at every external boundary (vector store,
//! embedding provider, generative model).
//!
//! This crate performs no network, database, or filesystem I/O. Concrete
//! providers and the SQLite store live in the `onboarding-copilot` app
//! crate.

pub mod chunk;
pub mod embedding;
pub mod generation;
pub mod models;
pub mod plan;
pub mod prompt;
pub mod store;

/// Name of the vector index collection that holds onboarding documents.
pub const COLLECTION_NAME: &str = "onboarding_docs";
