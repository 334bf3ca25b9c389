//! Report rendering.
//!
//! Turns a completed analysis into a shareable document with three labeled
//! sections: Summary, Action Items, and Transcript. The rendered bytes are
//! held in memory for download; nothing is persisted server-side.

use crate::analysis::AnalysisResult;
use crate::error::{ReferatError, Result};
use crate::meeting::MeetingType;
use crate::transcription::Transcript;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Output format for the generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Json,
    Text,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
            ReportFormat::Text => "txt",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            "text" | "txt" => Ok(ReportFormat::Text),
            _ => Err(format!("Unknown report format: {} (markdown, json, text)", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Markdown => write!(f, "markdown"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Text => write!(f, "text"),
        }
    }
}

/// A generated meeting report.
///
/// Deterministic for identical inputs apart from the embedded timestamp.
#[derive(Debug, Clone)]
pub struct Report {
    pub meeting_type: MeetingType,
    pub generated_at: DateTime<Local>,
    pub analysis: AnalysisResult,
    pub transcript: Transcript,
}

/// Serialized shape of the JSON report.
#[derive(Debug, Serialize)]
struct ReportExport<'a> {
    meeting_type: &'a str,
    generated_at: String,
    summary: &'a str,
    action_items: &'a str,
    transcript: &'a str,
}

impl Report {
    /// Build a report stamped with the current time.
    pub fn new(meeting_type: MeetingType, analysis: AnalysisResult, transcript: Transcript) -> Self {
        Self::at(meeting_type, analysis, transcript, Local::now())
    }

    /// Build a report with an explicit timestamp.
    pub fn at(
        meeting_type: MeetingType,
        analysis: AnalysisResult,
        transcript: Transcript,
        generated_at: DateTime<Local>,
    ) -> Self {
        Self {
            meeting_type,
            generated_at,
            analysis,
            transcript,
        }
    }

    /// Suggested download file name, e.g. `meeting_summary_20260806_141503.md`.
    pub fn file_name(&self, format: ReportFormat) -> String {
        format!(
            "meeting_summary_{}.{}",
            self.generated_at.format("%Y%m%d_%H%M%S"),
            format.extension()
        )
    }

    /// Render the report to bytes in the requested format.
    pub fn render(&self, format: ReportFormat) -> Result<Vec<u8>> {
        let rendered = match format {
            ReportFormat::Markdown => self.to_markdown(),
            ReportFormat::Text => self.to_text(),
            ReportFormat::Json => self.to_json()?,
        };
        Ok(rendered.into_bytes())
    }

    fn to_markdown(&self) -> String {
        format!(
            "# Meeting Summary Report\n\n\
             - Meeting type: {}\n\
             - Generated: {}\n\n\
             ## Summary\n\n{}\n\n\
             ## Action Items\n\n{}\n\n\
             ## Transcript\n\n{}\n",
            self.meeting_type.label(),
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
            self.analysis.summary,
            self.analysis.action_items,
            self.transcript.text()
        )
    }

    fn to_text(&self) -> String {
        let rule = "-".repeat(50);
        format!(
            "MEETING SUMMARY REPORT\n\
             Meeting type: {}\n\
             Generated: {}\n{rule}\n\n\
             SUMMARY\n\n{}\n\n{rule}\n\n\
             ACTION ITEMS\n\n{}\n\n{rule}\n\n\
             TRANSCRIPT\n\n{}\n",
            self.meeting_type.label(),
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
            self.analysis.summary,
            self.analysis.action_items,
            self.transcript.text()
        )
    }

    fn to_json(&self) -> Result<String> {
        let export = ReportExport {
            meeting_type: self.meeting_type.label(),
            generated_at: self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            summary: &self.analysis.summary,
            action_items: &self.analysis.action_items,
            transcript: self.transcript.text(),
        };
        serde_json::to_string_pretty(&export)
            .map_err(|e| ReferatError::DocumentGenerationFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_report() -> Report {
        let analysis = AnalysisResult {
            summary: "Alice shipped the API; Bob is blocked on DB access.".to_string(),
            action_items: "- Grant Bob DB access\n- Review the API rollout".to_string(),
        };
        let transcript =
            Transcript::from_text("Alice: finished API. Bob: blocked on DB access.").unwrap();
        let stamp = Local.with_ymd_and_hms(2026, 8, 6, 14, 15, 3).unwrap();
        Report::at(MeetingType::Standup, analysis, transcript, stamp)
    }

    #[test]
    fn test_markdown_sections_carry_content_verbatim() {
        let report = fixed_report();
        let rendered = String::from_utf8(report.render(ReportFormat::Markdown).unwrap()).unwrap();

        assert!(rendered.contains("## Summary"));
        assert!(rendered.contains("## Action Items"));
        assert!(rendered.contains("## Transcript"));
        assert!(rendered.contains("Alice shipped the API; Bob is blocked on DB access."));
        assert!(rendered.contains("- Grant Bob DB access\n- Review the API rollout"));
        assert!(rendered.contains("Alice: finished API. Bob: blocked on DB access."));
        assert!(rendered.contains("Daily Standup"));
    }

    #[test]
    fn test_rendering_is_deterministic_for_fixed_timestamp() {
        let report = fixed_report();
        assert_eq!(
            report.render(ReportFormat::Markdown).unwrap(),
            report.render(ReportFormat::Markdown).unwrap()
        );
        assert_eq!(
            report.render(ReportFormat::Json).unwrap(),
            report.render(ReportFormat::Json).unwrap()
        );
    }

    #[test]
    fn test_json_round_trips_content() {
        let report = fixed_report();
        let rendered = report.render(ReportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&rendered).unwrap();

        assert_eq!(
            parsed["summary"],
            "Alice shipped the API; Bob is blocked on DB access."
        );
        assert_eq!(
            parsed["transcript"],
            "Alice: finished API. Bob: blocked on DB access."
        );
        assert_eq!(parsed["meeting_type"], "Daily Standup");
    }

    #[test]
    fn test_file_name_embeds_timestamp_and_extension() {
        let report = fixed_report();
        assert_eq!(
            report.file_name(ReportFormat::Markdown),
            "meeting_summary_20260806_141503.md"
        );
        assert_eq!(
            report.file_name(ReportFormat::Json),
            "meeting_summary_20260806_141503.json"
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("md".parse::<ReportFormat>(), Ok(ReportFormat::Markdown));
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert!("docx".parse::<ReportFormat>().is_err());
    }
}
