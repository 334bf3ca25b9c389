//! Slack webhook delivery.
//!
//! Formats the analysis into a Block Kit message and issues a single POST to
//! the configured incoming webhook. Delivery failures are reported, never
//! fatal: the report stays downloadable regardless.

use crate::analysis::AnalysisResult;
use crate::error::{ReferatError, Result};
use crate::meeting::MeetingType;
use chrono::{DateTime, Local};
use std::time::Duration;
use tracing::{info, instrument, warn};

const WEBHOOK_PREFIX: &str = "https://hooks.slack.com/";

/// Check that a webhook URL has the expected Slack shape.
pub fn is_valid_webhook_url(url: &str) -> bool {
    url.starts_with(WEBHOOK_PREFIX) && url.len() > WEBHOOK_PREFIX.len() + 10
}

/// Posts meeting results to a Slack incoming webhook.
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    /// Create a notifier, validating the webhook URL shape up front.
    pub fn new(webhook_url: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let webhook_url = webhook_url.into();
        if !is_valid_webhook_url(&webhook_url) {
            return Err(ReferatError::Config(
                "Webhook URL does not look like a Slack incoming webhook \
                 (expected https://hooks.slack.com/...)"
                    .to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// Deliver the summary and action items. One POST, no retries.
    #[instrument(skip_all, fields(meeting_type = %meeting_type))]
    pub async fn send(&self, meeting_type: MeetingType, analysis: &AnalysisResult) -> Result<()> {
        if analysis.summary.trim().is_empty() && analysis.action_items.trim().is_empty() {
            return Err(ReferatError::DeliveryFailed("No content to send".to_string()));
        }

        let payload = build_payload(meeting_type, analysis, Local::now());

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ReferatError::DeliveryFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!("Slack message delivered");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!("Slack webhook returned {}: {}", status, body);
            Err(ReferatError::DeliveryFailed(format!("HTTP {}: {}", status, body)))
        }
    }
}

/// Build the Block Kit payload for one delivery.
fn build_payload(
    meeting_type: MeetingType,
    analysis: &AnalysisResult,
    now: DateTime<Local>,
) -> serde_json::Value {
    let mut blocks = vec![
        serde_json::json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("{} Summary - {}", meeting_type.label(), now.format("%B %d, %Y at %I:%M %p")),
            }
        }),
        serde_json::json!({ "type": "divider" }),
        serde_json::json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*Summary:*\n{}", analysis.summary),
            }
        }),
    ];

    let items = analysis.action_item_lines();
    if !items.is_empty() {
        let formatted = items
            .iter()
            .map(|item| format!("• {}", item.trim_start_matches(['-', '•', '*', ' '])))
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(serde_json::json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*Action Items:*\n{}", formatted),
            }
        }));
    }

    blocks.push(serde_json::json!({ "type": "divider" }));
    blocks.push(serde_json::json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!("Generated by Referat | {}", now.format("%Y-%m-%d %H:%M:%S")),
        }]
    }));

    serde_json::json!({ "blocks": blocks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            summary: "Alice shipped the API.".to_string(),
            action_items: "- Grant Bob DB access\n- Review rollout".to_string(),
        }
    }

    #[test]
    fn test_webhook_url_validation() {
        assert!(is_valid_webhook_url(
            "https://hooks.slack.com/services/T000/B000/XXXXXXXX"
        ));
        assert!(!is_valid_webhook_url("https://example.com/webhook"));
        assert!(!is_valid_webhook_url(""));
        assert!(!is_valid_webhook_url("https://hooks.slack.com/"));
    }

    #[test]
    fn test_notifier_rejects_bad_url() {
        assert!(SlackNotifier::new("https://example.com/hook", 30).is_err());
        assert!(SlackNotifier::new(
            "https://hooks.slack.com/services/T000/B000/XXXXXXXX",
            30
        )
        .is_ok());
    }

    #[test]
    fn test_payload_carries_summary_and_rebulleted_items() {
        let now = Local.with_ymd_and_hms(2026, 8, 6, 9, 30, 0).unwrap();
        let payload = build_payload(MeetingType::Standup, &analysis(), now);

        let rendered = payload.to_string();
        assert!(rendered.contains("Alice shipped the API."));
        assert!(rendered.contains("• Grant Bob DB access"));
        assert!(rendered.contains("Daily Standup Summary"));

        let blocks = payload["blocks"].as_array().unwrap();
        assert_eq!(blocks[0]["type"], "header");
        assert_eq!(blocks.last().unwrap()["type"], "context");
    }

    #[test]
    fn test_payload_omits_empty_action_section() {
        let now = Local.with_ymd_and_hms(2026, 8, 6, 9, 30, 0).unwrap();
        let no_items = AnalysisResult {
            summary: "Short sync.".to_string(),
            action_items: "No specific action items identified in this meeting".to_string(),
        };
        let payload = build_payload(MeetingType::General, &no_items, now);
        assert!(!payload.to_string().contains("*Action Items:*"));
    }
}
