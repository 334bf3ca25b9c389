//! Configuration settings for Referat.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub upload: UploadSettings,
    pub transcription: TranscriptionSettings,
    pub generation: GenerationSettings,
    pub slack: SlackSettings,
    pub prompts: PromptSettings,
    pub messages: Messages,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for temporary files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/referat".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Upload validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Maximum upload size in megabytes.
    pub max_file_size_mb: u64,
    /// Recognized video container extensions (audio gets extracted).
    pub video_formats: Vec<String>,
    /// Recognized audio extensions (transcribed directly).
    pub audio_formats: Vec<String>,
    /// Recognized plain-text transcript extensions (skip transcription).
    pub transcript_formats: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            video_formats: vec!["mp4".into(), "mov".into(), "avi".into()],
            audio_formats: vec!["wav".into(), "mp3".into()],
            transcript_formats: vec!["txt".into()],
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
    /// Duration in seconds for splitting long audio files.
    pub chunk_duration_seconds: u32,
    /// Maximum concurrent chunk transcriptions.
    pub max_concurrent_chunks: usize,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            chunk_duration_seconds: 120,
            max_concurrent_chunks: 3,
        }
    }
}

/// Text generation settings for summaries and action items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Chat model used for summary and action-item generation.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Ceiling for a single generation request, in seconds.
    pub timeout_seconds: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout_seconds: 120,
        }
    }
}

/// Slack webhook delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct SlackSettings {
    /// Incoming webhook URL. Falls back to the SLACK_WEBHOOK_URL env var.
    pub webhook_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: Option<u64>,
}


impl SlackSettings {
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(Self::DEFAULT_TIMEOUT_SECONDS)
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompt TOML files (overrides defaults).
    pub custom_dir: Option<String>,
}


/// User-facing message strings, keyed by failure or success kind.
///
/// A closed struct rather than an open dictionary, so a typo'd key fails at
/// deserialization instead of at display time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub file_too_large: String,
    pub invalid_file: String,
    pub no_audio: String,
    pub transcription_failed: String,
    pub empty_transcript: String,
    pub api_error: String,
    pub document_failed: String,
    pub slack_error: String,
    pub processing_complete: String,
    pub slack_sent: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            file_too_large: "File size exceeds the {max_size} MB limit. Please compress the \
                             recording or upload a shorter one."
                .to_string(),
            invalid_file: "Invalid file format. Please upload a supported file type.".to_string(),
            no_audio: "No audio could be extracted from the uploaded file. Please ensure it \
                       contains an audio track."
                .to_string(),
            transcription_failed: "Failed to transcribe the audio. The recording may be too \
                                   noisy or the file may be corrupted."
                .to_string(),
            empty_transcript: "No meaningful content found in the transcript. Please provide a \
                               longer recording or text."
                .to_string(),
            api_error: "The AI service is temporarily unavailable. Please try again in a few \
                        moments."
                .to_string(),
            document_failed: "Failed to generate the report document.".to_string(),
            slack_error: "Failed to send the message to Slack. Please check your webhook URL \
                          configuration."
                .to_string(),
            processing_complete: "Your meeting has been processed successfully.".to_string(),
            slack_sent: "Summary sent to Slack.".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or the default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ReferatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("referat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Resolve the webhook URL from config or the SLACK_WEBHOOK_URL env var.
    pub fn webhook_url(&self) -> Option<String> {
        self.slack
            .webhook_url
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| std::env::var("SLACK_WEBHOOK_URL").ok().filter(|u| !u.is_empty()))
    }

    /// Maximum upload size in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.upload.max_file_size_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_upload_formats() {
        let settings = Settings::default();
        assert!(settings.upload.video_formats.contains(&"mp4".to_string()));
        assert!(settings.upload.audio_formats.contains(&"wav".to_string()));
        assert!(settings.upload.transcript_formats.contains(&"txt".to_string()));
        assert_eq!(settings.max_file_size_bytes(), 100 * 1024 * 1024);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [upload]
            max_file_size_mb = 25
            "#,
        )
        .unwrap();
        assert_eq!(settings.upload.max_file_size_mb, 25);
        assert_eq!(settings.transcription.model, "whisper-1");
        assert!(!settings.messages.empty_transcript.is_empty());
    }
}
