//! Meeting analysis: summary and action-item generation.
//!
//! Formats the transcript into the prompt pair for the selected meeting
//! type and issues two independent generation requests, one for the summary
//! and one for action items. There is no caching; every run re-queries the
//! model.

mod generator;

pub use generator::{OpenAiGenerator, TextGenerator};

use crate::config::Prompts;
use crate::error::Result;
use crate::meeting::MeetingType;
use crate::transcription::Transcript;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// The output of one analysis run: a summary and an action-items text.
///
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub action_items: String,
}

impl AnalysisResult {
    /// Parse the action-items text into individual bullet lines.
    ///
    /// Keeps lines with a `-`, `•`, or `*` prefix; a leading unbulleted line
    /// is adopted as the first item unless it reads as "no action items".
    pub fn action_item_lines(&self) -> Vec<String> {
        let mut items = Vec::new();
        for line in self.action_items.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('-') || line.starts_with('•') || line.starts_with('*') {
                items.push(line.to_string());
            } else if items.is_empty() && !line.to_lowercase().starts_with("no") {
                items.push(format!("- {}", line));
            }
        }
        items
    }
}

/// Generates summaries and action items from transcripts.
pub struct Analyzer {
    generator: Arc<dyn TextGenerator>,
    prompts: Prompts,
}

impl Analyzer {
    pub fn new(generator: Arc<dyn TextGenerator>, prompts: Prompts) -> Self {
        Self { generator, prompts }
    }

    /// Run both generation requests for a transcript.
    #[instrument(skip(self, transcript), fields(meeting_type = %meeting_type, words = transcript.word_count()))]
    pub async fn analyze(
        &self,
        transcript: &Transcript,
        meeting_type: MeetingType,
    ) -> Result<AnalysisResult> {
        let pair = self.prompts.pair_for(meeting_type);

        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), transcript.text().to_string());

        let summary_prompt = Prompts::render(&pair.summary, &vars);
        let actions_prompt = Prompts::render(&pair.actions, &vars);

        info!("Generating summary for {} meeting", meeting_type);
        let summary = self.generator.generate(&summary_prompt).await?;

        info!("Generating action items");
        let action_items = self.generator.generate(&actions_prompt).await?;

        Ok(AnalysisResult {
            summary,
            action_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReferatError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Test double that records every prompt and replays canned outputs.
    pub struct ScriptedGenerator {
        pub prompts: Mutex<Vec<String>>,
        outputs: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(outputs: Vec<&str>) -> Self {
            let mut outputs: Vec<String> = outputs.into_iter().map(String::from).collect();
            outputs.reverse();
            Self {
                prompts: Mutex::new(Vec::new()),
                outputs: Mutex::new(outputs),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.outputs
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ReferatError::MalformedResponse("script exhausted".into()))
        }
    }

    fn transcript() -> Transcript {
        Transcript::from_text("Alice: finished API. Bob: blocked on DB access.").unwrap()
    }

    #[tokio::test]
    async fn test_analyze_issues_two_requests() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            "Team status summary.",
            "- Unblock Bob's DB access",
        ]));
        let analyzer = Analyzer::new(generator.clone(), Prompts::default());

        let result = analyzer
            .analyze(&transcript(), MeetingType::Standup)
            .await
            .unwrap();

        assert_eq!(result.summary, "Team status summary.");
        assert_eq!(result.action_items, "- Unblock Bob's DB access");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("Alice: finished API"));
        assert!(prompts[1].contains("Bob: blocked on DB access"));
    }

    #[tokio::test]
    async fn test_meeting_type_routes_distinct_prompts() {
        let transcript = transcript();

        let general_gen = Arc::new(ScriptedGenerator::new(vec!["s", "a"]));
        Analyzer::new(general_gen.clone(), Prompts::default())
            .analyze(&transcript, MeetingType::General)
            .await
            .unwrap();

        let standup_gen = Arc::new(ScriptedGenerator::new(vec!["s", "a"]));
        Analyzer::new(standup_gen.clone(), Prompts::default())
            .analyze(&transcript, MeetingType::Standup)
            .await
            .unwrap();

        let general_prompts = general_gen.prompts.lock().unwrap();
        let standup_prompts = standup_gen.prompts.lock().unwrap();
        assert_ne!(general_prompts[0], standup_prompts[0]);
        assert_ne!(general_prompts[1], standup_prompts[1]);
        // Both carry the same transcript despite different templates
        assert!(standup_prompts[0].contains("Alice: finished API"));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let generator = Arc::new(ScriptedGenerator::new(vec!["only one output"]));
        let analyzer = Analyzer::new(generator, Prompts::default());

        let err = analyzer
            .analyze(&transcript(), MeetingType::General)
            .await
            .unwrap_err();
        assert!(matches!(err, ReferatError::MalformedResponse(_)));
    }

    #[test]
    fn test_action_item_lines_keeps_bullets() {
        let result = AnalysisResult {
            summary: String::new(),
            action_items: "- First task\n• Second task\n* Third task\n\nSome trailing note"
                .to_string(),
        };
        let lines = result.action_item_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "- First task");
    }

    #[test]
    fn test_action_item_lines_adopts_leading_unbulleted_line() {
        let result = AnalysisResult {
            summary: String::new(),
            action_items: "Follow up with the vendor".to_string(),
        };
        assert_eq!(result.action_item_lines(), vec!["- Follow up with the vendor"]);
    }

    #[test]
    fn test_action_item_lines_skips_no_items_answer() {
        let result = AnalysisResult {
            summary: String::new(),
            action_items: "No specific action items identified in this meeting".to_string(),
        };
        assert!(result.action_item_lines().is_empty());
    }
}
