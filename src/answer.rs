//! Grounded question answering.

use std::sync::Arc;

use onboarding_core::generation::GenerativeModel;
use onboarding_core::prompt::{build_answer_prompt, FALLBACK_ANSWER};

use crate::retrieve::Retriever;

/// How an answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The model answered with retrieved context in the prompt.
    Grounded,
    /// The model answered, but retrieval found nothing.
    NoContext,
    /// The model failed or returned no text; the text is [`FALLBACK_ANSWER`].
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub outcome: AnswerOutcome,
    /// Number of chunks placed in the prompt.
    pub context_chunks: usize,
}

pub struct AnswerGenerator {
    retriever: Retriever,
    model: Arc<dyn GenerativeModel>,
    temperature: f32,
}

impl AnswerGenerator {
    pub fn new(retriever: Retriever, model: Arc<dyn GenerativeModel>, temperature: f32) -> Self {
        Self {
            retriever,
            model,
            temperature,
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Answer `question` from the indexed documents. Never fails.
    pub async fn answer(&self, question: &str) -> Answer {
        let chunks = self.retriever.retrieve(question).await;
        let prompt = build_answer_prompt(&chunks, question);

        let text = match self.model.generate(&prompt, self.temperature).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!(model = self.model.model_name(), "model returned no text");
                return fallback(chunks.len());
            }
            Err(e) => {
                tracing::warn!(model = self.model.model_name(), error = %e, "generation failed");
                return fallback(chunks.len());
            }
        };

        let outcome = if chunks.is_empty() {
            AnswerOutcome::NoContext
        } else {
            AnswerOutcome::Grounded
        };

        Answer {
            text,
            outcome,
            context_chunks: chunks.len(),
        }
    }
}

fn fallback(context_chunks: usize) -> Answer {
    Answer {
        text: FALLBACK_ANSWER.to_string(),
        outcome: AnswerOutcome::Fallback,
        context_chunks,
    }
}
