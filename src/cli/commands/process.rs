//! Process command - run the whole pipeline for one file.

use crate::cli::{content_preview, preflight, Output};
use crate::config::Settings;
use crate::intake::{self, MediaKind, Upload};
use crate::meeting::MeetingType;
use crate::orchestrator::Orchestrator;
use crate::report::ReportFormat;
use crate::session::Stage;
use std::path::Path;

/// Run the process command.
pub async fn run_process(
    file: &str,
    meeting_type: &str,
    output: Option<String>,
    format: &str,
    notify: bool,
    settings: Settings,
) -> anyhow::Result<()> {
    let format: ReportFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let meeting_type = MeetingType::from_tag(meeting_type);

    let upload = Upload::read_from(Path::new(file))?;

    // Fail before any expensive stage if a requirement is missing
    let operation = match intake::classify(&upload, &settings.upload) {
        Some(MediaKind::Video) | Some(MediaKind::Audio) => preflight::Operation::ProcessMedia,
        // Unknown extensions fall through so validation reports the error
        _ => preflight::Operation::ProcessText,
    };
    preflight::check(operation)?;

    if notify && settings.webhook_url().is_none() {
        anyhow::bail!(
            "No webhook configured for --notify. Set slack.webhook_url or SLACK_WEBHOOK_URL."
        );
    }

    let orchestrator = Orchestrator::new(settings)?;
    let messages = orchestrator.messages().clone();

    Output::header("Referat");
    Output::kv("File", &upload.file_name);
    Output::kv("Meeting type", meeting_type.label());
    println!();

    let mut session = orchestrator.run(upload, meeting_type).await;

    match session.stage() {
        Stage::Ready => {}
        Stage::Failed => {
            if let Some(user_message) = session.user_error() {
                Output::error(user_message);
            }
            if let Some(detail) = session.error() {
                Output::kv("Detail", detail);
            }
            std::process::exit(1);
        }
        other => anyhow::bail!("Pipeline stopped in unexpected stage: {}", other),
    }

    let report = orchestrator.build_report(&session)?;

    Output::success(&messages.processing_complete);
    Output::section("Summary", &report.analysis.summary);

    let items = report.analysis.action_item_lines();
    if items.is_empty() {
        Output::section("Action Items", "(none identified)");
    } else {
        println!("\n{}", console::style("Action Items").bold());
        for item in &items {
            Output::list_item(item.trim_start_matches(['-', '•', '*', ' ']));
        }
    }

    Output::section(
        "Transcript preview",
        &content_preview(report.transcript.text(), 300),
    );

    let rendered = report.render(format)?;

    match output.as_deref() {
        Some("-") => {
            println!();
            println!("{}", String::from_utf8_lossy(&rendered));
        }
        path => {
            let path = path
                .map(str::to_string)
                .unwrap_or_else(|| report.file_name(format));
            std::fs::write(&path, &rendered)?;
            println!();
            Output::success(&format!("Report written to {}", path));
        }
    }

    // Delivery failures are reported but never sink the run
    if notify {
        let spinner = Output::spinner("Sending to Slack...");
        let delivery = orchestrator.notify(&mut session).await;
        spinner.finish_and_clear();
        match delivery {
            Ok(()) => Output::success(&messages.slack_sent),
            Err(err) => {
                Output::warning(&err.user_message(&messages));
                Output::warning(&format!("Delivery detail: {}", err));
                Output::info("The report above is unaffected.");
            }
        }
    }

    Ok(())
}
