//! Transcription module for Referat.
//!
//! Converts an audio file into a plain-text transcript using OpenAI Whisper.
//! Long recordings are segmented and transcribed with bounded concurrency.

mod whisper;

pub use whisper::{is_api_key_configured, WhisperTranscriber};

use crate::error::{ReferatError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file to text.
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// A meeting transcript.
///
/// Invariant: the text is non-empty after trimming. Construction through
/// [`Transcript::from_text`] enforces this; whitespace-only input is an
/// `EmptyTranscript` failure, not a crash downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    /// Build a transcript, rejecting content that is empty after trimming.
    pub fn from_text(text: impl Into<String>) -> Result<Self> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(ReferatError::EmptyTranscript);
        }
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_trims() {
        let t = Transcript::from_text("  hello world \n").unwrap();
        assert_eq!(t.text(), "hello world");
        assert_eq!(t.word_count(), 2);
    }

    #[test]
    fn test_whitespace_only_is_empty_transcript() {
        let err = Transcript::from_text("   \n\t  ").unwrap_err();
        assert!(matches!(err, ReferatError::EmptyTranscript));
    }
}
