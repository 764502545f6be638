//! Reveal.js slide-deck generation.
//!
//! Asks the chat endpoint, in a presentation-designer persona, for a
//! complete Reveal.js HTML document covering the explanation. The reply
//! is taken as-is; no structural validation is attempted.

use tracing::info;

use crate::error::PipelineError;
use crate::openai::ChatBackend;

const PERSONA: &str = "You are a creative and detail-oriented presentation designer skilled in Reveal.js. \
Generate an aesthetically pleasing, modern, and highly engaging Reveal.js HTML presentation for the following explanation. \
Use the 'moon' theme for a stylish look. Add animations for slide transitions (e.g., fade, zoom, or convex) \
and text appearance (e.g., fade-in, slide-up). Incorporate cool and vibrant colors like blues, purples, and gradients \
for slide backgrounds and elements. Ensure a clean layout with readable fonts, proper spacing, and elegant transitions. \
Provide subtle visual effects like shadows or transparent overlays for a dynamic feel.";

/// Generate the slide-deck markup for `explanation`.
pub async fn generate<C: ChatBackend>(
    chat: &C,
    explanation: &str,
) -> Result<String, PipelineError> {
    info!("Generating Reveal.js presentation");
    chat.chat(PERSONA, explanation)
        .await
        .map_err(PipelineError::SlideGeneration)
}
