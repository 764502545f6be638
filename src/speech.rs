//! Speech synthesis for the explanation.
//!
//! Sends the full explanation to the TTS endpoint in one call (no
//! chunking) and streams the MP3 response to the run's audio path.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::PipelineError;
use crate::openai::SpeechBackend;

/// Synthesize `explanation` to an MP3 at `path`, overwriting any
/// existing file. Returns the path written.
pub async fn synthesize<S: SpeechBackend>(
    speech: &S,
    explanation: &str,
    path: &Path,
) -> Result<PathBuf, PipelineError> {
    info!("Synthesizing explanation audio");
    speech
        .synthesize_to(explanation, path)
        .await
        .map_err(PipelineError::SpeechSynthesis)?;
    info!("Audio saved at {}", path.display());
    Ok(path.to_path_buf())
}
