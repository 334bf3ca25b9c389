//! Prompt templates for Referat.
//!
//! Each meeting type carries a pair of templates: one for the summary and
//! one for action items. Pairs can be customized by placing TOML files named
//! after the meeting type in the custom prompts directory.

use crate::meeting::MeetingType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A summary/action-items template pair for one meeting type.
///
/// Templates reference the transcript as `{{transcript}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptPair {
    pub summary: String,
    pub actions: String,
}

impl Default for PromptPair {
    fn default() -> Self {
        Self {
            summary: r#"You are an expert meeting analyst. Analyze the following meeting transcript and create a comprehensive summary.

TRANSCRIPT:
{{transcript}}

Provide a well-structured summary that covers:

1. **Meeting Overview**: Brief context and purpose
2. **Key Discussion Points**: Main topics covered (3-5 bullet points)
3. **Decisions Made**: Concrete decisions or agreements reached
4. **Important Information**: Critical details, numbers, dates, or commitments mentioned
5. **Next Steps**: Follow-up activities or future meetings

Write in clear, professional language suitable for stakeholders who weren't present. Keep it concise but comprehensive (150-300 words). Focus on actionable information and key takeaways rather than the minute-by-minute conversation flow."#.to_string(),

            actions: r#"You are a project management expert. Analyze the following meeting transcript and extract all action items, tasks, and commitments.

TRANSCRIPT:
{{transcript}}

Guidelines:

1. Identify all actionable tasks: commitments, assignments, deadlines, and follow-up items
2. Note who is responsible for each task, when mentioned
3. Note deadlines or timelines, when mentioned
4. Make each action item specific and actionable

Format each action item as a bullet point starting with "-":
- [Task description] - Assigned to [Person] by [Date/Timeline]
- [Task description] - [Additional context if needed]

If no clear action items are found, respond with:
- No specific action items identified in this meeting

Only include items that represent concrete actions to be taken, not general discussion points."#.to_string(),
        }
    }
}

/// Collection of prompt pairs, one per meeting type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub general: PromptPair,
    pub standup: PromptPair,
    pub planning: PromptPair,
    pub retrospective: PromptPair,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            general: PromptPair::default(),

            standup: PromptPair {
                summary: r#"Analyze this standup/daily scrum meeting transcript:

{{transcript}}

Provide a summary covering:
1. **Team Updates**: What each team member accomplished
2. **Current Work**: What everyone is working on today
3. **Blockers**: Any impediments or challenges mentioned
4. **Sprint Progress**: Overall team progress toward goals

Keep it concise and focused on status updates."#.to_string(),

                actions: r#"Extract action items from this standup meeting:

{{transcript}}

Focus on:
- Tasks to unblock team members
- Follow-up items mentioned
- Issues that need resolution
- Commitments for the day or sprint

Format as bullet points with a "-" prefix."#.to_string(),
            },

            planning: PromptPair {
                summary: r#"Analyze this planning meeting transcript:

{{transcript}}

Summarize:
1. **Planning Scope**: What period or project was planned
2. **Goals & Objectives**: Main targets set
3. **Resource Allocation**: People, time, and budget decisions
4. **Key Milestones**: Important dates and deliverables
5. **Risks & Dependencies**: Challenges identified

Focus on strategic decisions and commitments."#.to_string(),

                actions: r#"Extract planning-related action items:

{{transcript}}

Look for:
- Tasks to prepare for upcoming work
- Research or investigation items
- Resource acquisition needs
- Milestone preparation activities
- Risk mitigation actions

Format as bullet points with a "-" prefix."#.to_string(),
            },

            retrospective: PromptPair {
                summary: r#"Analyze this retrospective meeting transcript:

{{transcript}}

Summarize:
1. **What Went Well**: Positive outcomes and successes
2. **What Could Improve**: Areas for enhancement
3. **Action Items**: Concrete steps for improvement
4. **Team Insights**: Key learnings and observations

Focus on improvement opportunities and team dynamics."#.to_string(),

                actions: r#"Extract improvement action items from this retrospective:

{{transcript}}

Focus on:
- Process improvements to implement
- Tools or practices to try
- Training or skill development needs
- Communication enhancements

Format as bullet points with a "-" prefix."#.to_string(),
            },
        }
    }
}

impl Prompts {
    /// Load prompts, overriding defaults from TOML files in `custom_dir`.
    ///
    /// Each meeting type reads from `<custom_dir>/<type>.toml` when present
    /// (e.g. `standup.toml` with `summary` and `actions` keys).
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            for meeting_type in MeetingType::ALL {
                let pair_path = custom_path.join(format!("{}.toml", meeting_type));
                if pair_path.exists() {
                    let content = std::fs::read_to_string(&pair_path)?;
                    *prompts.pair_for_mut(meeting_type) = toml::from_str(&content)?;
                }
            }
        }

        Ok(prompts)
    }

    /// The template pair for a meeting type.
    pub fn pair_for(&self, meeting_type: MeetingType) -> &PromptPair {
        match meeting_type {
            MeetingType::General => &self.general,
            MeetingType::Standup => &self.standup,
            MeetingType::Planning => &self.planning,
            MeetingType::Retrospective => &self.retrospective,
        }
    }

    fn pair_for_mut(&mut self, meeting_type: MeetingType) -> &mut PromptPair {
        match meeting_type {
            MeetingType::General => &mut self.general,
            MeetingType::Standup => &mut self.standup,
            MeetingType::Planning => &mut self.planning,
            MeetingType::Retrospective => &mut self.retrospective,
        }
    }

    /// Verify every template carries the transcript placeholder.
    ///
    /// Run at startup so a broken custom prompt fails before any upload is
    /// accepted.
    pub fn validate(&self) -> crate::error::Result<()> {
        for meeting_type in MeetingType::ALL {
            let pair = self.pair_for(meeting_type);
            for (name, template) in [("summary", &pair.summary), ("actions", &pair.actions)] {
                if !template.contains("{{transcript}}") {
                    return Err(crate::error::ReferatError::Config(format!(
                        "{} {} prompt is missing the {{{{transcript}}}} placeholder",
                        meeting_type, name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts_validate() {
        let prompts = Prompts::default();
        assert!(prompts.validate().is_ok());
    }

    #[test]
    fn test_pairs_differ_per_meeting_type() {
        let prompts = Prompts::default();
        assert_ne!(prompts.general.summary, prompts.standup.summary);
        assert_ne!(prompts.standup.actions, prompts.retrospective.actions);
    }

    #[test]
    fn test_render_template() {
        let template = "Summarize this meeting:\n{{transcript}}";
        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), "Alice: done. Bob: blocked.".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Summarize this meeting:\nAlice: done. Bob: blocked.");
    }

    #[test]
    fn test_validate_rejects_missing_placeholder() {
        let mut prompts = Prompts::default();
        prompts.planning.actions = "No placeholder here".to_string();
        assert!(prompts.validate().is_err());
    }
}
