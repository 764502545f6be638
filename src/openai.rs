//! OpenAI API client for chat completions and speech synthesis.
//!
//! Plain reqwest against the REST endpoints; request bodies built with
//! serde_json. Every call carries a request timeout and a bounded
//! retry-with-backoff loop. Server errors and 429 retry; client errors
//! fail immediately.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;

/// Chat completion backend, injectable so tests can substitute fakes.
pub trait ChatBackend {
    fn chat(
        &self,
        system: &str,
        user: &str,
    ) -> impl std::future::Future<Output = Result<String, ApiError>> + Send;
}

/// Speech synthesis backend. Streams the audio response to `path`.
pub trait SpeechBackend {
    fn synthesize_to(
        &self,
        text: &str,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    tts_model: String,
    voice: String,
    attempts: u32,
    backoff: Duration,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let api_key = if config.openai.api_key.is_empty() {
            std::env::var("OPENAI_API_KEY").map_err(|_| ApiError::MissingApiKey)?
        } else {
            config.openai.api_key.clone()
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.retry.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            api_key,
            base_url: config.openai.base_url.trim_end_matches('/').to_string(),
            chat_model: config.openai.chat_model.clone(),
            tts_model: config.tts.model.clone(),
            voice: config.tts.voice.clone(),
            attempts: config.retry.attempts.max(1),
            backoff: Duration::from_millis(config.retry.backoff_ms),
        })
    }

    /// POST `body` to `url`, retrying transient failures with doubling
    /// backoff. Returns the first successful response.
    async fn post_with_retry(&self, url: &str, body: &Value) -> Result<reqwest::Response, ApiError> {
        let mut delay = self.backoff;

        for attempt in 1..=self.attempts {
            let last = attempt == self.attempts;
            match self
                .client
                .post(url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    let retryable =
                        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
                    if last || !retryable {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(ApiError::Status { status, body });
                    }
                    warn!("{url} returned {status}, retrying (attempt {attempt}/{})", self.attempts);
                }
                Err(e) => {
                    if last {
                        return Err(e.into());
                    }
                    warn!("{url} request failed: {e}, retrying (attempt {attempt}/{})", self.attempts);
                }
            }

            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        unreachable!("retry loop always returns on the last attempt")
    }
}

impl ChatBackend for OpenAiClient {
    /// Send a two-message exchange and return the top completion's text.
    async fn chat(&self, system: &str, user: &str) -> Result<String, ApiError> {
        debug!("Chat request to model '{}' ({} chars)", self.chat_model, user.len());

        let body = json!({
            "model": self.chat_model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let url = format!("{}/chat/completions", self.base_url);
        let resp = self.post_with_retry(&url, &body).await?;

        let data: Value = resp.json().await?;
        let text = data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ApiError::EmptyCompletion);
        }

        debug!("Chat response: {} chars", text.len());
        Ok(text.to_string())
    }
}

impl SpeechBackend for OpenAiClient {
    /// Synthesize `text` in a single call, streaming the MP3 response
    /// chunk-by-chunk to `path`. Overwrites any existing file.
    async fn synthesize_to(&self, text: &str, path: &Path) -> Result<(), ApiError> {
        debug!(
            "Speech request to model '{}' voice '{}' ({} chars)",
            self.tts_model, self.voice, text.len()
        );

        let body = json!({
            "model": self.tts_model,
            "voice": self.voice,
            "input": text,
        });

        let url = format!("{}/audio/speech", self.base_url);
        let mut resp = self.post_with_retry(&url, &body).await?;

        let mut file = tokio::fs::File::create(path).await?;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }
}
