//! Source document extraction.
//!
//! Pulls text out of an optional uploaded document: direct read for
//! .txt, page text extraction for .pdf. Anything else is rejected with
//! a typed error before it can reach the chat stage as literal input.

use std::path::Path;

use tracing::{debug, info};

use crate::error::PipelineError;

/// Extract the text of an optional source document.
///
/// Returns `Ok(None)` when no document was supplied.
pub fn extract(path: Option<&Path>) -> Result<Option<String>, PipelineError> {
    let Some(path) = path else {
        debug!("No document uploaded, proceeding with the question alone");
        return Ok(None);
    };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("txt") => {
            info!("Reading text document {}", path.display());
            let text = std::fs::read_to_string(path).map_err(|source| {
                PipelineError::DocumentRead {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            Ok(Some(text))
        }
        Some("pdf") => {
            info!("Extracting text from PDF {}", path.display());
            let text = pdf_extract::extract_text(path).map_err(|source| {
                PipelineError::PdfExtract {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            Ok(Some(text))
        }
        _ => Err(PipelineError::UnsupportedFormat(path.to_path_buf())),
    }
}
