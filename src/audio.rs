//! Audio processing utilities.
//!
//! This module wraps ffmpeg/ffprobe for extracting the audio track from
//! video uploads and segmenting long audio before transcription.

use crate::error::{ReferatError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Sample rate the transcriber works best with.
const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Extracts the audio track from a video file as 16 kHz mono WAV.
///
/// The output lands in `output_dir`, which the caller owns; cleanup is the
/// caller's run-scoped temp directory, not this function.
#[instrument(skip_all, fields(video = %video_path.display()))]
pub async fn extract_audio(video_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    if !has_audio_stream(video_path).await? {
        return Err(ReferatError::ExtractionFailed(
            "No audio track found in video file".into(),
        ));
    }

    let base_name = video_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let audio_path = output_dir.join(format!("{}.wav", base_name));

    info!("Extracting audio track");

    let result = Command::new("ffmpeg")
        .arg("-i").arg(video_path)
        .arg("-vn")
        .arg("-acodec").arg("pcm_s16le")
        .arg("-ar").arg(TARGET_SAMPLE_RATE.to_string())
        .arg("-ac").arg("1")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(&audio_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReferatError::ToolNotFound("ffmpeg".into()));
        }
        Err(e) => {
            return Err(ReferatError::ExtractionFailed(format!(
                "ffmpeg execution failed: {e}"
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReferatError::ExtractionFailed(format!("ffmpeg failed: {stderr}")));
    }

    let size = std::fs::metadata(&audio_path).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        return Err(ReferatError::ExtractionFailed(
            "ffmpeg produced an empty audio file".into(),
        ));
    }

    debug!("Extracted audio: {} ({} bytes)", audio_path.display(), size);
    Ok(audio_path)
}

/// Checks whether a media file carries at least one audio stream.
async fn has_audio_stream(path: &Path) -> Result<bool> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-select_streams").arg("a")
        .arg("-show_entries").arg("stream=index")
        .arg("-print_format").arg("json")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReferatError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(ReferatError::ExtractionFailed(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(ReferatError::ExtractionFailed(
            "ffprobe could not read the container".into(),
        ));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|_| ReferatError::ExtractionFailed("Invalid ffprobe output".into()))?;

    Ok(parsed["streams"]
        .as_array()
        .map(|streams| !streams.is_empty())
        .unwrap_or(false))
}

/// Segments a long audio file into smaller chunks for transcription.
///
/// Each chunk will be approximately `chunk_seconds` long. Returns tuples of
/// (chunk_path, offset_seconds) for each segment.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = chunk_seconds as f64;

    // Short audio doesn't need splitting
    if total_duration <= chunk_len {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let ext = source
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("wav");

    let mut segments = Vec::new();
    let mut offset = 0.0;
    let mut idx = 0u32;

    while offset < total_duration {
        let segment_path = output_dir.join(format!("{}_{:04}.{}", base_name, idx, ext));
        let segment_len = chunk_len.min(total_duration - offset);

        extract_segment(source, &segment_path, offset, segment_len).await?;

        debug!("Created segment {} at offset {:.1}s", idx, offset);
        segments.push((segment_path, offset));

        offset += chunk_len;
        idx += 1;
    }

    info!("Created {} audio segments", segments.len());
    Ok(segments)
}

/// Extracts a time segment from an audio file.
async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    // First attempt: stream copy (fast, no quality loss)
    let copy_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Ok(status) = copy_result {
        if status.success() && dest.exists() {
            return Ok(());
        }
    }

    // Fallback: re-encode
    warn!("Stream copy failed, re-encoding segment");

    let encode_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-acodec").arg("pcm_s16le")
        .arg("-ar").arg(TARGET_SAMPLE_RATE.to_string())
        .arg("-ac").arg("1")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match encode_result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(ReferatError::ExtractionFailed(format!(
                "Segment extraction failed: {err}"
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ReferatError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(ReferatError::ExtractionFailed(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of a media file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReferatError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(ReferatError::ExtractionFailed(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(ReferatError::ExtractionFailed("ffprobe returned error".into()));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|_| ReferatError::ExtractionFailed("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| ReferatError::ExtractionFailed("Could not determine audio duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_input_reports_extraction_or_tool_error() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope.mp4");
        let err = probe_duration(&missing).await.unwrap_err();
        assert!(matches!(
            err,
            ReferatError::ExtractionFailed(_) | ReferatError::ToolNotFound(_)
        ));
    }
}
