//! Text-generation clients.
//!
//! Each client sends one prompt as a single user turn and returns the
//! concatenated text of the reply. A reply with no text (for example a
//! safety block with no candidates) comes back as an empty string, and
//! the caller decides how to degrade.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use onboarding_core::generation::GenerativeModel;

use crate::config::{GenerationConfig, Secrets};
use crate::http;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

// ============ Gemini ============

/// Gemini `generateContent` client.
pub struct GeminiModel {
    model: String,
    api_key: String,
    base_url: String,
    max_retries: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationParams,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationParams {
    temperature: f32,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiModel {
    pub fn new(config: &GenerationConfig, secrets: &Secrets) -> Result<Self> {
        let api_key = secrets
            .gemini_api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))?;
        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config
                .url
                .clone()
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            max_retries: config.max_retries,
            client: http::client(config.timeout_secs)?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Join the text parts of the first candidate.
fn gemini_text(json: serde_json::Value) -> Result<String> {
    let response: GenerateResponse = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Failed to parse Gemini response: {}", e))?;

    Ok(response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default())
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationParams { temperature },
        };
        let url = self.endpoint();

        let json = http::send_json_with_retry(
            || {
                self.client
                    .post(&url)
                    .header("x-goog-api-key", &self.api_key)
                    .json(&request)
            },
            self.max_retries,
            "Gemini",
        )
        .await?;

        gemini_text(json)
    }
}

// ============ OpenAI ============

/// OpenAI chat completions client.
pub struct OpenAIModel {
    model: String,
    api_key: String,
    base_url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIModel {
    pub fn new(config: &GenerationConfig, secrets: &Secrets) -> Result<Self> {
        let api_key = secrets
            .openai_api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config
                .url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            max_retries: config.max_retries,
            client: http::client(config.timeout_secs)?,
        })
    }
}

fn openai_text(json: &serde_json::Value) -> String {
    json.pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl GenerativeModel for OpenAIModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": temperature,
        });
        let url = format!("{}/chat/completions", self.base_url);

        let json = http::send_json_with_retry(
            || {
                self.client
                    .post(&url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .json(&body)
            },
            self.max_retries,
            "OpenAI",
        )
        .await?;

        Ok(openai_text(&json))
    }
}

// ============ Ollama ============

/// Ollama `/api/generate` client (non-streaming).
pub struct OllamaModel {
    model: String,
    url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OllamaModel {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        Ok(Self {
            model: config.model.clone(),
            url: config
                .url
                .clone()
                .unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            max_retries: config.max_retries,
            client: http::client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl GenerativeModel for OllamaModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": temperature },
        });
        let url = format!("{}/api/generate", self.url);

        let json = http::send_json_with_retry(
            || self.client.post(&url).json(&body),
            self.max_retries,
            "Ollama",
        )
        .await
        .map_err(|e| anyhow::anyhow!("{} (is Ollama running at {}?)", e, self.url))?;

        Ok(json
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or_default()
            .to_string())
    }
}

/// Create the configured [`GenerativeModel`].
pub fn create_model(
    config: &GenerationConfig,
    secrets: &Secrets,
) -> Result<Box<dyn GenerativeModel>> {
    match config.provider.as_str() {
        "gemini" => Ok(Box::new(GeminiModel::new(config, secrets)?)),
        "openai" => Ok(Box::new(OpenAIModel::new(config, secrets)?)),
        "ollama" => Ok(Box::new(OllamaModel::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}
