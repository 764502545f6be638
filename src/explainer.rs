//! Explanation generation.
//!
//! Combines the optional document text with the user's question and asks
//! the chat endpoint for a podcast-host style explanation.

use tracing::info;

use crate::error::PipelineError;
use crate::openai::ChatBackend;

const PERSONA: &str = "You are an engaging and knowledgeable podcast host. \
Answer questions in a clear and instructional tone, providing step-by-step guidance.";

const QUESTION_SEPARATOR: &str = "\n\nUser's Question: ";

/// Build the single prompt sent to the chat stage: the question alone,
/// or the document text followed by the separator and the question.
pub fn combined_prompt(document: Option<&str>, question: &str) -> String {
    match document {
        None => question.to_string(),
        Some(text) => format!("{text}{QUESTION_SEPARATOR}{question}"),
    }
}

/// Generate the spoken-style explanation for `question`, optionally
/// grounded in `document`.
pub async fn generate<C: ChatBackend>(
    chat: &C,
    document: Option<&str>,
    question: &str,
) -> Result<String, PipelineError> {
    info!("Generating explanation");
    let prompt = combined_prompt(document, question);
    chat.chat(PERSONA, &prompt)
        .await
        .map_err(PipelineError::Explanation)
}
