//! Web form surface for the presentation pipeline.
//!
//! Serves a minimal upload-plus-question form, runs the pipeline on
//! submission, and exposes the generated artifacts for download. The
//! audio file is served from the same run path so the relative `src`
//! inside the presentation resolves in a browser.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::render_chain;
use crate::openai::OpenAiClient;
use crate::pipeline::{Pipeline, RunRequest, AUDIO_FILENAME, PRESENTATION_FILENAME};

static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline<OpenAiClient, OpenAiClient>>,
    output_dir: PathBuf,
}

#[derive(Serialize)]
struct GenerateResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl GenerateResponse {
    fn ok(run_id: String) -> Self {
        let download_url = format!("/artifacts/{run_id}/{PRESENTATION_FILENAME}");
        Self {
            status: "ok".into(),
            run_id: Some(run_id),
            download_url: Some(download_url),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            run_id: None,
            download_url: None,
            error: Some(message.into()),
        }
    }
}

const FORM_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>slidecast</title>
  <style>
    body { font-family: sans-serif; max-width: 40rem; margin: 3rem auto; }
    label { display: block; margin-top: 1rem; }
    #status { margin-top: 1rem; white-space: pre-wrap; }
  </style>
</head>
<body>
  <h1>AI-Powered Presentation Generator</h1>
  <p>Upload a .txt or .pdf file (optional) and ask a question related to it.
     The result is a Reveal.js presentation with continuous narration.</p>
  <form id="form">
    <label>Document (optional) <input type="file" name="document"></label>
    <label>Question (required) <input type="text" name="question" size="60" required></label>
    <button type="submit">Generate Presentation</button>
  </form>
  <div id="status"></div>
  <div id="download"></div>
  <script>
    const form = document.getElementById('form');
    form.addEventListener('submit', async (e) => {
      e.preventDefault();
      document.getElementById('status').textContent = 'Generating...';
      document.getElementById('download').innerHTML = '';
      const resp = await fetch('/generate', { method: 'POST', body: new FormData(form) });
      const data = await resp.json();
      if (data.status === 'ok') {
        document.getElementById('status').textContent = 'Presentation generated successfully!';
        document.getElementById('download').innerHTML =
          '<a href="' + data.download_url + '" download>Download Your Presentation</a>';
      } else {
        document.getElementById('status').textContent = data.error;
      }
    });
  </script>
</body>
</html>
"#;

/// Build the axum router.
fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/generate", post(handle_generate))
        .route("/artifacts/{run_id}/{file}", get(handle_artifact))
        .with_state(state)
}

/// Serve the web form until the process is stopped.
pub async fn serve(config: &Config, client: OpenAiClient) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = config.output.dir.clone();
    let pipeline = Arc::new(Pipeline::new(client.clone(), client, output_dir.clone()));
    let state = AppState {
        pipeline,
        output_dir,
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web form listening on http://{addr}");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn handle_index() -> Html<&'static str> {
    Html(FORM_PAGE)
}

async fn handle_generate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Json<GenerateResponse> {
    let mut question = String::new();
    let mut upload: Option<PathBuf> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                cleanup_upload(&upload).await;
                return Json(GenerateResponse::err(format!("invalid form data: {e}")));
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("question") => {
                question = match field.text().await {
                    Ok(text) => text,
                    Err(e) => {
                        cleanup_upload(&upload).await;
                        return Json(GenerateResponse::err(format!("invalid form data: {e}")));
                    }
                };
            }
            Some("document") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                // Browsers send an empty file field when nothing is selected.
                if file_name.is_empty() {
                    continue;
                }
                let bytes = match field.bytes().await {
                    Ok(b) => b,
                    Err(e) => {
                        cleanup_upload(&upload).await;
                        return Json(GenerateResponse::err(format!("upload failed: {e}")));
                    }
                };
                match save_upload(&file_name, &bytes).await {
                    Ok(path) => upload = Some(path),
                    Err(e) => {
                        cleanup_upload(&upload).await;
                        return Json(GenerateResponse::err(format!("upload failed: {e}")));
                    }
                }
            }
            _ => {}
        }
    }

    if question.trim().is_empty() {
        cleanup_upload(&upload).await;
        return Json(GenerateResponse::err("a question is required"));
    }

    let request = RunRequest {
        question,
        document_path: upload.clone(),
    };
    let result = state.pipeline.run(&request).await;
    cleanup_upload(&upload).await;

    match result {
        Ok(artifacts) => Json(GenerateResponse::ok(artifacts.run_id().to_string())),
        Err(e) => {
            warn!("Pipeline run failed: {}", render_chain(&e));
            Json(GenerateResponse::err(render_chain(&e)))
        }
    }
}

async fn handle_artifact(
    State(state): State<AppState>,
    UrlPath((run_id, file)): UrlPath<(String, String)>,
) -> Response {
    if !is_valid_run_id(&run_id) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let content_type = match file.as_str() {
        PRESENTATION_FILENAME => "text/html; charset=utf-8",
        AUDIO_FILENAME => "audio/mpeg",
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    let path = state.output_dir.join(&run_id).join(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Run identifiers are directory names of the form produced by the
/// pipeline; reject anything that could traverse out of the output root.
fn is_valid_run_id(run_id: &str) -> bool {
    run_id.starts_with("run-")
        && run_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Persist an uploaded document to a temp path, keeping the original
/// filename so extension-based extraction still applies.
async fn save_upload(file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "slidecast-upload-{}-{seq}-{base}",
        std::process::id()
    ));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

async fn cleanup_upload(upload: &Option<PathBuf>) {
    if let Some(path) = upload {
        let _ = tokio::fs::remove_file(path).await;
    }
}
