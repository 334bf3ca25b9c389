//! Pipeline orchestrator for Referat.
//!
//! Coordinates a run from upload validation through analysis, driving the
//! session state machine one stage at a time. Stages run strictly in
//! sequence; the first failure aborts the rest of the run.

use crate::analysis::{Analyzer, OpenAiGenerator, TextGenerator};
use crate::config::{Messages, Prompts, Settings};
use crate::error::{ReferatError, Result};
use crate::intake::{self, MediaKind, Upload};
use crate::meeting::MeetingType;
use crate::notify::SlackNotifier;
use crate::report::Report;
use crate::session::{Session, Stage};
use crate::transcription::{Transcriber, Transcript, WhisperTranscriber};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// The main orchestrator for the Referat pipeline.
pub struct Orchestrator {
    settings: Settings,
    transcriber: Arc<dyn Transcriber>,
    analyzer: Analyzer,
}

impl Orchestrator {
    /// Create a new orchestrator from settings.
    ///
    /// Prompts are loaded and validated here so a broken custom template
    /// fails before any upload is accepted.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
        prompts.validate()?;

        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::with_config(
            &settings.transcription.model,
            settings.transcription.chunk_duration_seconds,
            settings.transcription.max_concurrent_chunks,
        ));

        let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiGenerator::with_config(
            &settings.generation.model,
            settings.generation.temperature,
            settings.generation.timeout_seconds,
        ));

        let analyzer = Analyzer::new(generator, prompts);

        Ok(Self {
            settings,
            transcriber,
            analyzer,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self> {
        prompts.validate()?;
        Ok(Self {
            settings,
            transcriber,
            analyzer: Analyzer::new(generator, prompts),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn messages(&self) -> &Messages {
        &self.settings.messages
    }

    /// Run the whole pipeline for one upload.
    ///
    /// Always returns the session: `Ready` with transcript and analysis
    /// attached, or `Failed` with the originating error recorded.
    #[instrument(skip_all, fields(file = %upload.file_name, meeting_type = %meeting_type))]
    pub async fn run(&self, upload: Upload, meeting_type: MeetingType) -> Session {
        let mut session = Session::new(meeting_type);

        if let Err(err) = self.drive(&mut session, upload, meeting_type).await {
            error!("Run failed during {}: {}", session.stage(), err);
            let user_message = err.user_message(self.messages());
            session.fail_with_user_message(&err, user_message);
        }

        session
    }

    async fn drive(
        &self,
        session: &mut Session,
        upload: Upload,
        meeting_type: MeetingType,
    ) -> Result<()> {
        session.advance(Stage::Validating)?;
        let kind = intake::validate(&upload, &self.settings.upload)?;
        info!(
            "Accepted {} upload '{}' ({} bytes)",
            match kind {
                MediaKind::Video => "video",
                MediaKind::Audio => "audio",
                MediaKind::Transcript => "transcript",
            },
            upload.file_name,
            upload.size_bytes()
        );

        let transcript = match kind {
            MediaKind::Transcript => {
                let text = String::from_utf8(upload.bytes).map_err(|_| {
                    ReferatError::InvalidInput("Transcript file is not valid UTF-8".to_string())
                })?;
                Transcript::from_text(text)?
            }
            MediaKind::Video | MediaKind::Audio => {
                self.transcribe_media(session, &upload, kind).await?
            }
        };

        info!("Transcript ready ({} words)", transcript.word_count());
        session.transcript = Some(transcript.clone());

        session.advance(Stage::Summarizing)?;
        eprintln!("  Generating summary and action items...");
        let analysis = self.analyzer.analyze(&transcript, meeting_type).await?;
        session.analysis = Some(analysis);

        session.advance(Stage::Ready)?;
        info!("Run complete");
        Ok(())
    }

    /// Persist the upload to a run-scoped temp directory, extract audio if
    /// needed, and transcribe.
    ///
    /// The `TempDir` owns every intermediate file; it is removed when this
    /// function returns, on success and on every error path alike.
    async fn transcribe_media(
        &self,
        session: &mut Session,
        upload: &Upload,
        kind: MediaKind,
    ) -> Result<Transcript> {
        let temp_dir = tempfile::tempdir_in(ensure_temp_root(&self.settings)?)?;

        let file_name = Path::new(&upload.file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin");
        let input_path = temp_dir.path().join(file_name);
        tokio::fs::write(&input_path, &upload.bytes).await?;

        let audio_path = if kind == MediaKind::Video {
            session.advance(Stage::Extracting)?;
            eprintln!("  Extracting audio from video...");
            crate::audio::extract_audio(&input_path, temp_dir.path()).await?
        } else {
            input_path
        };

        session.advance(Stage::Transcribing)?;
        eprintln!("  Converting speech to text...");
        self.transcriber.transcribe(&audio_path).await
    }

    /// Build the downloadable report for a completed run.
    pub fn build_report(&self, session: &Session) -> Result<Report> {
        let (transcript, analysis) = match (&session.transcript, &session.analysis) {
            (Some(t), Some(a)) if session.is_ready() => (t.clone(), a.clone()),
            _ => {
                return Err(ReferatError::DocumentGenerationFailed(
                    "Run has not completed".to_string(),
                ))
            }
        };
        Ok(Report::new(session.meeting_type(), analysis, transcript))
    }

    /// Deliver a completed run's results to the configured webhook.
    ///
    /// Non-fatal by contract: on failure the session stays `Ready` with the
    /// delivery error recorded, and the error is returned for reporting.
    pub async fn notify(&self, session: &mut Session) -> Result<()> {
        let analysis = session
            .analysis
            .clone()
            .filter(|_| session.is_ready())
            .ok_or_else(|| {
                ReferatError::InvalidInput("Nothing to deliver: run has not completed".to_string())
            })?;

        let webhook_url = self.settings.webhook_url().ok_or_else(|| {
            ReferatError::Config(
                "No webhook configured. Set slack.webhook_url or SLACK_WEBHOOK_URL.".to_string(),
            )
        })?;

        let notifier = SlackNotifier::new(webhook_url, self.settings.slack.timeout_seconds())?;

        session.advance(Stage::Notifying)?;
        match notifier.send(session.meeting_type(), &analysis).await {
            Ok(()) => {
                session.advance(Stage::Ready)?;
                Ok(())
            }
            Err(err) => {
                session.fail(&err);
                Err(err)
            }
        }
    }
}

/// Make sure the configured temp root exists before carving run dirs in it.
fn ensure_temp_root(settings: &Settings) -> Result<std::path::PathBuf> {
    let root = settings.temp_dir();
    std::fs::create_dir_all(&root)?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedTranscriber;

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, _audio_path: &Path) -> Result<Transcript> {
            Transcript::from_text("stub transcript")
        }
    }

    /// Generator double: records prompts, answers from a fixed script.
    struct StubGenerator {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl StubGenerator {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if self.fail {
                return Err(ReferatError::ModelUnavailable("stubbed outage".into()));
            }
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            if prompts.len() == 1 {
                Ok("Alice finished the API work; Bob is blocked on DB access.".to_string())
            } else {
                Ok("- Grant Bob DB access - Assigned to Alice".to_string())
            }
        }
    }

    fn orchestrator_with(generator: Arc<dyn TextGenerator>) -> Orchestrator {
        let mut settings = Settings::default();
        settings.general.temp_dir = std::env::temp_dir()
            .join("referat-test")
            .to_string_lossy()
            .to_string();
        Orchestrator::with_components(
            settings,
            Prompts::default(),
            Arc::new(FixedTranscriber),
            generator,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_standup_text_upload_end_to_end() {
        let orchestrator = orchestrator_with(Arc::new(StubGenerator::new()));
        let upload = Upload::new(
            "standup_notes.txt",
            b"Alice: finished API. Bob: blocked on DB access.".to_vec(),
        );

        let session = orchestrator.run(upload, MeetingType::Standup).await;

        assert!(session.is_ready());
        let analysis = session.analysis.as_ref().unwrap();
        assert!(analysis.summary.contains("Alice"));
        assert!(analysis.summary.contains("Bob"));
        assert!(analysis.action_items.contains("DB access"));

        let report = orchestrator.build_report(&session).unwrap();
        let rendered =
            String::from_utf8(report.render(crate::report::ReportFormat::Markdown).unwrap())
                .unwrap();
        assert!(rendered.contains("Alice: finished API."));
    }

    #[tokio::test]
    async fn test_oversized_upload_stops_before_any_stage() {
        let generator = Arc::new(StubGenerator::new());
        let mut settings = Settings::default();
        settings.upload.max_file_size_mb = 1;
        let orchestrator = Orchestrator::with_components(
            settings,
            Prompts::default(),
            Arc::new(FixedTranscriber),
            generator.clone(),
        )
        .unwrap();

        let upload = Upload::new("big.txt", vec![b'a'; 2 * 1024 * 1024]);
        let session = orchestrator.run(upload, MeetingType::General).await;

        assert_eq!(session.stage(), Stage::Failed);
        assert!(session.error().unwrap().contains("limit"));
        // No generation request was ever issued
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_extension_fails_validation() {
        let orchestrator = orchestrator_with(Arc::new(StubGenerator::new()));
        let upload = Upload::new("slides.pdf", vec![1, 2, 3]);

        let session = orchestrator.run(upload, MeetingType::General).await;

        assert_eq!(session.stage(), Stage::Failed);
        assert!(session.error().unwrap().contains("pdf"));
    }

    #[tokio::test]
    async fn test_whitespace_transcript_fails_before_summarizer() {
        let generator = Arc::new(StubGenerator::new());
        let orchestrator = orchestrator_with(generator.clone());
        let upload = Upload::new("notes.txt", b"   \n\t  \n".to_vec());

        let session = orchestrator.run(upload, MeetingType::General).await;

        assert_eq!(session.stage(), Stage::Failed);
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generator_outage_fails_run() {
        let orchestrator = orchestrator_with(Arc::new(StubGenerator::failing()));
        let upload = Upload::new("notes.txt", b"A real transcript.".to_vec());

        let session = orchestrator.run(upload, MeetingType::Retrospective).await;

        assert_eq!(session.stage(), Stage::Failed);
        assert!(session.error().unwrap().contains("unavailable"));
        assert!(orchestrator.build_report(&session).is_err());
    }

    #[tokio::test]
    async fn test_notify_without_webhook_is_config_error() {
        let orchestrator = orchestrator_with(Arc::new(StubGenerator::new()));
        let upload = Upload::new("notes.txt", b"A real transcript.".to_vec());
        let mut session = orchestrator.run(upload, MeetingType::General).await;
        assert!(session.is_ready());

        // No webhook in settings; env fallback may exist on dev machines,
        // so only assert when it is absent.
        if std::env::var("SLACK_WEBHOOK_URL").is_err() {
            let err = orchestrator.notify(&mut session).await.unwrap_err();
            assert!(matches!(err, ReferatError::Config(_)));
            assert!(session.is_ready());
        }
    }
}
