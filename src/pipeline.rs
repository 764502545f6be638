//! Pipeline orchestration.
//!
//! extract → explain → synthesize → slides → embed → write, linear with
//! no branching except early termination: the first stage error aborts
//! the run and surfaces as the user-facing status. Each run writes into
//! its own timestamped directory so concurrent submissions never race on
//! shared paths.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use crate::error::PipelineError;
use crate::openai::{ChatBackend, SpeechBackend};
use crate::{document, embed, explainer, slides, speech};

pub const AUDIO_FILENAME: &str = "explanation_audio.mp3";
pub const PRESENTATION_FILENAME: &str = "presentation.html";

// Disambiguates run directories created within the same millisecond.
static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

/// One pipeline invocation: the question plus an optional document.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub question: String,
    pub document_path: Option<PathBuf>,
}

/// Artifacts of a successful run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub run_dir: PathBuf,
    pub audio_path: PathBuf,
    pub presentation_path: PathBuf,
}

impl RunArtifacts {
    /// Directory name component, usable as a run identifier.
    pub fn run_id(&self) -> &str {
        self.run_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

pub struct Pipeline<C, S> {
    chat: C,
    speech: S,
    output_dir: PathBuf,
}

impl<C: ChatBackend, S: SpeechBackend> Pipeline<C, S> {
    pub fn new(chat: C, speech: S, output_dir: PathBuf) -> Self {
        Self {
            chat,
            speech,
            output_dir,
        }
    }

    /// Run the full pipeline for one request.
    pub async fn run(&self, request: &RunRequest) -> Result<RunArtifacts, PipelineError> {
        let document = document::extract(request.document_path.as_deref())?;

        let explanation =
            explainer::generate(&self.chat, document.as_deref(), &request.question).await?;

        let run_dir = self.create_run_dir()?;
        let audio_path =
            speech::synthesize(&self.speech, &explanation, &run_dir.join(AUDIO_FILENAME)).await?;

        let markup = slides::generate(&self.chat, &explanation).await?;
        let markup = embed::embed_audio(&markup, AUDIO_FILENAME);

        let presentation_path = run_dir.join(PRESENTATION_FILENAME);
        std::fs::write(&presentation_path, &markup).map_err(|source| PipelineError::Write {
            path: presentation_path.clone(),
            source,
        })?;

        info!("Presentation saved at {}", presentation_path.display());

        Ok(RunArtifacts {
            run_dir,
            audio_path,
            presentation_path,
        })
    }

    /// Create a fresh per-run directory under the output root.
    fn create_run_dir(&self) -> Result<PathBuf, PipelineError> {
        // Millis make names unique across processes sharing an output
        // root; the counter covers same-millisecond runs in-process.
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S-%3f");
        let seq = RUN_SEQ.fetch_add(1, Ordering::Relaxed);
        let run_dir = self.output_dir.join(format!("run-{stamp}-{seq}"));

        std::fs::create_dir_all(&run_dir).map_err(|source| PipelineError::Write {
            path: run_dir.clone(),
            source,
        })?;

        Ok(run_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Records every (system, user) exchange; replies in order.
    struct FakeChat {
        replies: Mutex<Vec<String>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeChat {
        fn with_replies(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ChatBackend for FakeChat {
        async fn chat(&self, system: &str, user: &str) -> Result<String, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or(ApiError::EmptyCompletion)
        }
    }

    /// Chat backend that always fails.
    struct FailingChat;

    impl ChatBackend for FailingChat {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String, ApiError> {
            Err(ApiError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".into(),
            })
        }
    }

    /// Writes fixed bytes and counts invocations.
    struct FakeSpeech {
        audio: Vec<u8>,
        calls: AtomicUsize,
    }

    impl FakeSpeech {
        fn new() -> Self {
            Self {
                audio: b"ID3-fake-mp3".to_vec(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SpeechBackend for FakeSpeech {
        async fn synthesize_to(&self, _text: &str, path: &Path) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::fs::write(path, &self.audio)?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn end_to_end_without_document() {
        let out = tempfile::tempdir().unwrap();
        let chat = FakeChat::with_replies(&[
            "Gravity is the attraction between masses.",
            "<html><body><div class=\"reveal\"></div></body></html>",
        ]);
        let pipeline = Pipeline::new(chat, FakeSpeech::new(), out.path().to_path_buf());

        let request = RunRequest {
            question: "Explain gravity".into(),
            document_path: None,
        };
        let artifacts = pipeline.run(&request).await.unwrap();

        // Explanation stage received the bare question.
        let calls = pipeline.chat.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, "Explain gravity");
        // Slide stage received the explanation.
        assert_eq!(calls[1].1, "Gravity is the attraction between masses.");

        // Audio written at the run's fixed filename.
        assert_eq!(std::fs::read(&artifacts.audio_path).unwrap(), b"ID3-fake-mp3");
        assert_eq!(
            artifacts.audio_path.file_name().and_then(|n| n.to_str()),
            Some(AUDIO_FILENAME)
        );

        // Final markup has the audio block spliced in.
        let markup = std::fs::read_to_string(&artifacts.presentation_path).unwrap();
        assert!(markup.contains("background-audio"));
        assert!(markup.contains(AUDIO_FILENAME));
        assert!(artifacts.run_dir.starts_with(out.path()));
    }

    #[tokio::test]
    async fn run_with_text_document_combines_prompt() {
        let out = tempfile::tempdir().unwrap();
        let doc_path = out.path().join("notes.txt");
        std::fs::write(&doc_path, "Apples fall downward.").unwrap();

        let chat = FakeChat::with_replies(&["An explanation.", "<body></body>"]);
        let pipeline = Pipeline::new(chat, FakeSpeech::new(), out.path().to_path_buf());

        let request = RunRequest {
            question: "Explain gravity".into(),
            document_path: Some(doc_path),
        };
        pipeline.run(&request).await.unwrap();

        let calls = pipeline.chat.calls();
        assert_eq!(
            calls[0].1,
            "Apples fall downward.\n\nUser's Question: Explain gravity"
        );
    }

    #[tokio::test]
    async fn chat_failure_halts_before_speech_and_slides() {
        let out = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(FailingChat, FakeSpeech::new(), out.path().to_path_buf());

        let request = RunRequest {
            question: "Explain gravity".into(),
            document_path: None,
        };
        let err = pipeline.run(&request).await.unwrap_err();

        assert!(matches!(err, PipelineError::Explanation(_)));
        assert_eq!(pipeline.speech.calls.load(Ordering::SeqCst), 0);
        // No run directory was created for the failed run.
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn unsupported_document_halts_before_any_chat_call() {
        let out = tempfile::tempdir().unwrap();
        let doc_path = out.path().join("notes.docx");
        std::fs::write(&doc_path, "irrelevant").unwrap();

        let chat = FakeChat::with_replies(&[]);
        let pipeline = Pipeline::new(chat, FakeSpeech::new(), out.path().to_path_buf());

        let request = RunRequest {
            question: "Explain gravity".into(),
            document_path: Some(doc_path),
        };
        let err = pipeline.run(&request).await.unwrap_err();

        assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
        assert!(pipeline.chat.calls().is_empty());
    }

    #[tokio::test]
    async fn run_directory_name_carries_timestamp_and_millis() {
        let out = tempfile::tempdir().unwrap();
        let chat = FakeChat::with_replies(&["An explanation.", "<body></body>"]);
        let pipeline = Pipeline::new(chat, FakeSpeech::new(), out.path().to_path_buf());

        let request = RunRequest {
            question: "Explain gravity".into(),
            document_path: None,
        };
        let artifacts = pipeline.run(&request).await.unwrap();

        // run-YYYYMMDD-HHMMSS-mmm-<seq>
        let parts: Vec<&str> = artifacts.run_id().split('-').collect();
        assert_eq!(parts[0], "run");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
        assert_eq!(parts[3].len(), 3);
        assert!(parts[1..4].iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
        assert!(parts[4].chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn consecutive_runs_use_distinct_run_directories() {
        let out = tempfile::tempdir().unwrap();
        let chat = FakeChat::with_replies(&[
            "First explanation.",
            "<body></body>",
            "Second explanation.",
            "<body></body>",
        ]);
        let pipeline = Pipeline::new(chat, FakeSpeech::new(), out.path().to_path_buf());

        let request = RunRequest {
            question: "Explain gravity".into(),
            document_path: None,
        };
        let first = pipeline.run(&request).await.unwrap();
        let second = pipeline.run(&request).await.unwrap();

        assert_ne!(first.run_dir, second.run_dir);
        assert!(first.presentation_path.exists());
        assert!(second.presentation_path.exists());
    }
}
