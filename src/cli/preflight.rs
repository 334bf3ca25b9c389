//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools, keys, and endpoints are available before
//! starting a pipeline run that would otherwise fail midway.

use crate::error::{ReferatError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Processing a text transcript needs only the generation API key.
    ProcessText,
    /// Processing audio/video additionally needs ffmpeg and ffprobe.
    ProcessMedia,
    /// Delivery needs a configured webhook URL.
    Notify,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::ProcessText => {
            check_api_key()?;
        }
        Operation::ProcessMedia => {
            check_api_key()?;
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
        Operation::Notify => {
            // Webhook presence is checked by the caller against settings;
            // nothing external to probe here.
        }
    }
    Ok(())
}

/// Check if the OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(ReferatError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(ReferatError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash)
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(ReferatError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ReferatError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(ReferatError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_notify_no_external_requirements() {
        assert!(check(Operation::Notify).is_ok());
    }
}
