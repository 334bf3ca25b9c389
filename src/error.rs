//! Error types for Referat.

use crate::config::Messages;
use thiserror::Error;

/// Library-level error type for Referat operations.
#[derive(Error, Debug)]
pub enum ReferatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File is {size_mb} MB, exceeding the {limit_mb} MB limit")]
    FileTooLarge { size_mb: u64, limit_mb: u64 },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("Audio extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("No discernible speech found in the recording")]
    EmptyTranscript,

    #[error("Generation service unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Generation request timed out after {0} seconds")]
    ModelTimeout(u64),

    #[error("Generation model returned an unusable response: {0}")]
    MalformedResponse(String),

    #[error("Document generation failed: {0}")]
    DocumentGenerationFailed(String),

    #[error("Webhook delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ReferatError {
    /// Map this error to the configured user-facing message for its kind.
    ///
    /// The `Display` impl keeps the diagnostic detail for logs; this is what
    /// gets shown to the person who uploaded the file.
    pub fn user_message(&self, messages: &Messages) -> String {
        match self {
            ReferatError::FileTooLarge { limit_mb, .. } => messages
                .file_too_large
                .replace("{max_size}", &limit_mb.to_string()),
            ReferatError::UnsupportedFormat(_) | ReferatError::EmptyFile => {
                messages.invalid_file.clone()
            }
            ReferatError::ExtractionFailed(_) => messages.no_audio.clone(),
            ReferatError::TranscriptionFailed(_) => messages.transcription_failed.clone(),
            ReferatError::EmptyTranscript => messages.empty_transcript.clone(),
            ReferatError::ModelUnavailable(_)
            | ReferatError::ModelTimeout(_)
            | ReferatError::MalformedResponse(_) => messages.api_error.clone(),
            ReferatError::DocumentGenerationFailed(_) => messages.document_failed.clone(),
            ReferatError::DeliveryFailed(_) => messages.slack_error.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this error leaves an otherwise completed run usable.
    ///
    /// A failed webhook delivery is reported but never invalidates the
    /// generated report.
    pub fn is_non_fatal(&self) -> bool {
        matches!(self, ReferatError::DeliveryFailed(_))
    }

    /// Whether the failure was caused by the uploaded input rather than the
    /// service. Drives the HTTP status the API answers with.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            ReferatError::FileTooLarge { .. }
                | ReferatError::UnsupportedFormat(_)
                | ReferatError::EmptyFile
                | ReferatError::EmptyTranscript
                | ReferatError::InvalidInput(_)
        )
    }
}

/// Result type alias for Referat operations.
pub type Result<T> = std::result::Result<T, ReferatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_substitutes_limit() {
        let messages = Messages::default();
        let err = ReferatError::FileTooLarge {
            size_mb: 250,
            limit_mb: 100,
        };
        let msg = err.user_message(&messages);
        assert!(msg.contains("100"));
        assert!(!msg.contains("{max_size}"));
    }

    #[test]
    fn test_delivery_failure_is_non_fatal() {
        assert!(ReferatError::DeliveryFailed("503".into()).is_non_fatal());
        assert!(!ReferatError::EmptyTranscript.is_non_fatal());
        assert!(!ReferatError::ModelTimeout(120).is_non_fatal());
    }
}
