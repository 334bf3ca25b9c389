//! Referat - Meeting Summaries and Action Items
//!
//! Turns meeting recordings or transcripts into structured summaries and
//! action items, renders a shareable report, and can post the result to a
//! Slack channel.
//!
//! The name "Referat" comes from the Norwegian word for "meeting minutes."
//!
//! # Overview
//!
//! Referat runs a strictly sequential pipeline per upload:
//!
//! 1. Validate the file (type, size)
//! 2. Extract the audio track (video uploads)
//! 3. Transcribe the audio (OpenAI Whisper)
//! 4. Generate a summary and action items (chat completions)
//! 5. Render a report and optionally deliver it to Slack
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration, prompts, and message strings
//! - `intake` - Upload validation
//! - `audio` - Audio extraction and segmentation (ffmpeg)
//! - `transcription` - Speech-to-text transcription
//! - `analysis` - Summary and action-item generation
//! - `report` - Report document rendering
//! - `notify` - Slack webhook delivery
//! - `session` - Per-run state machine
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use referat::config::Settings;
//! use referat::intake::Upload;
//! use referat::meeting::MeetingType;
//! use referat::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let upload = Upload::read_from(std::path::Path::new("standup.mp4"))?;
//!     let session = orchestrator.run(upload, MeetingType::Standup).await;
//!
//!     if let Some(analysis) = &session.analysis {
//!         println!("{}", analysis.summary);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod intake;
pub mod meeting;
pub mod notify;
pub mod openai;
pub mod orchestrator;
pub mod report;
pub mod session;
pub mod transcription;

pub use error::{ReferatError, Result};
