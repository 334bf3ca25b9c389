//! Upload intake and validation.
//!
//! Checks an uploaded file's extension and size against the configured
//! limits before any pipeline stage touches it. Validation only reads
//! metadata; the bytes are not inspected.

use crate::config::UploadSettings;
use crate::error::{ReferatError, Result};
use std::path::Path;
use tracing::debug;

/// An uploaded file: declared name plus raw bytes.
///
/// Lives only for the duration of one run.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an upload from a local path (CLI intake).
    pub fn read_from(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ReferatError::InvalidInput(format!("Not a file path: {}", path.display())))?
            .to_string();
        let bytes = std::fs::read(path)?;
        Ok(Self { file_name, bytes })
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension of the declared file name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// How an upload enters the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Video container; audio gets extracted before transcription.
    Video,
    /// Audio file; transcribed directly.
    Audio,
    /// Plain-text transcript; skips extraction and transcription.
    Transcript,
}

/// Classify an upload by its declared extension, without validating size.
pub fn classify(upload: &Upload, settings: &UploadSettings) -> Option<MediaKind> {
    let ext = upload.extension()?;

    if settings.video_formats.iter().any(|f| f.eq_ignore_ascii_case(&ext)) {
        Some(MediaKind::Video)
    } else if settings.audio_formats.iter().any(|f| f.eq_ignore_ascii_case(&ext)) {
        Some(MediaKind::Audio)
    } else if settings.transcript_formats.iter().any(|f| f.eq_ignore_ascii_case(&ext)) {
        Some(MediaKind::Transcript)
    } else {
        None
    }
}

/// Validate an upload against the configured limits.
///
/// Returns the media kind on success, or the first applicable failure:
/// `EmptyFile`, `UnsupportedFormat`, then `FileTooLarge`.
pub fn validate(upload: &Upload, settings: &UploadSettings) -> Result<MediaKind> {
    if upload.bytes.is_empty() {
        return Err(ReferatError::EmptyFile);
    }

    let kind = classify(upload, settings).ok_or_else(|| {
        ReferatError::UnsupportedFormat(
            upload.extension().unwrap_or_else(|| upload.file_name.clone()),
        )
    })?;

    let limit_bytes = settings.max_file_size_mb * 1024 * 1024;
    if upload.size_bytes() > limit_bytes {
        return Err(ReferatError::FileTooLarge {
            size_mb: upload.size_bytes().div_ceil(1024 * 1024),
            limit_mb: settings.max_file_size_mb,
        });
    }

    debug!(
        "Accepted upload '{}' ({} bytes, {:?})",
        upload.file_name,
        upload.size_bytes(),
        kind
    );
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> UploadSettings {
        UploadSettings::default()
    }

    #[test]
    fn test_classifies_by_extension() {
        let s = settings();
        assert_eq!(
            validate(&Upload::new("standup.MP4", vec![1]), &s).unwrap(),
            MediaKind::Video
        );
        assert_eq!(
            validate(&Upload::new("call.wav", vec![1]), &s).unwrap(),
            MediaKind::Audio
        );
        assert_eq!(
            validate(&Upload::new("notes.txt", vec![1]), &s).unwrap(),
            MediaKind::Transcript
        );
    }

    #[test]
    fn test_rejects_unsupported_format() {
        let err = validate(&Upload::new("deck.pdf", vec![1]), &settings()).unwrap_err();
        assert!(matches!(err, ReferatError::UnsupportedFormat(ext) if ext == "pdf"));
    }

    #[test]
    fn test_rejects_missing_extension() {
        let err = validate(&Upload::new("recording", vec![1]), &settings()).unwrap_err();
        assert!(matches!(err, ReferatError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_rejects_empty_file() {
        let err = validate(&Upload::new("notes.txt", vec![]), &settings()).unwrap_err();
        assert!(matches!(err, ReferatError::EmptyFile));
    }

    #[test]
    fn test_rejects_oversized_file() {
        let mut s = settings();
        s.max_file_size_mb = 1;
        let upload = Upload::new("big.mp3", vec![0u8; 1024 * 1024 + 1]);
        let err = validate(&upload, &s).unwrap_err();
        assert!(
            matches!(err, ReferatError::FileTooLarge { size_mb: 2, limit_mb: 1 }),
            "got {:?}",
            err
        );
    }
}
