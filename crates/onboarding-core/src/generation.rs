//! Generative model boundary.
//!
//! The answer and plan generators only ever need one stateless call:
//! prompt in, text out. Concrete clients (Gemini, OpenAI, Ollama) live in
//! the app crate.

use anyhow::Result;
use async_trait::async_trait;

/// A text-generation model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, used in logs.
    fn model_name(&self) -> &str;

    /// Send `prompt` as a single user turn and return the model's text.
    ///
    /// An empty string means the model produced no usable text; callers
    /// decide how to degrade.
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;
}
