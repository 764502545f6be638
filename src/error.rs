//! Structured pipeline errors.
//!
//! Every stage boundary returns a typed error so the orchestrator never
//! has to inspect content strings to decide whether a stage failed.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the remote OpenAI API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no API key configured (set openai.api_key or OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("request failed")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response contained no completion text")]
    EmptyCompletion,

    #[error("failed to write audio stream")]
    AudioSink(#[from] std::io::Error),
}

/// Render an error with its full source chain, for user-facing status
/// messages.
pub fn render_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Errors from any stage of the presentation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unsupported file format: {} (only .txt and .pdf are accepted)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to read document {}", .path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract text from {}", .path.display())]
    PdfExtract {
        path: PathBuf,
        #[source]
        source: pdf_extract::OutputError,
    },

    #[error("explanation generation failed")]
    Explanation(#[source] ApiError),

    #[error("speech synthesis failed")]
    SpeechSynthesis(#[source] ApiError),

    #[error("slide generation failed")]
    SlideGeneration(#[source] ApiError),

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
