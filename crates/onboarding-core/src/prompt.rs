//! Prompt construction for grounded answers.
//!
//! The answer prompt always has three parts, in order: the fixed system
//! instruction, the retrieved context, and the verbatim question.

/// Instruction that constrains answers to the supplied context.
pub const SYSTEM_PROMPT: &str = "You are an Employee Onboarding Copilot.

You MUST:
- Answer using ONLY the provided context from company onboarding, tools, and HR documents.
- If something is not present or is unclear in the context, say you are not sure and suggest asking HR or the hiring manager.
- Be friendly, clear, and practical.
- Focus on helping new hires understand forms, tools, trainings, and first weeks at the company.";

/// Context placeholder used when retrieval returned nothing.
pub const NO_CONTEXT: &str = "No relevant context found.";

/// Returned to the caller when the model fails or produces no text.
pub const FALLBACK_ANSWER: &str = "Sorry, I could not generate an answer.";

/// Join retrieved chunk texts with a blank line, or return [`NO_CONTEXT`].
pub fn format_context(chunks: &[String]) -> String {
    let non_empty: Vec<&str> = chunks
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if non_empty.is_empty() {
        NO_CONTEXT.to_string()
    } else {
        non_empty.join("\n\n")
    }
}

/// Build the single prompt sent to the model for a question.
pub fn build_answer_prompt(chunks: &[String], question: &str) -> String {
    format!(
        "{}\n\nContext:\n{}\n\nQuestion:\n{}",
        SYSTEM_PROMPT,
        format_context(chunks),
        question
    )
}
