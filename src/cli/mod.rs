//! CLI module for Referat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{content_preview, Output};

use clap::{Parser, Subcommand};

/// Referat - Meeting Summaries and Action Items
///
/// Turns meeting recordings or transcripts into structured summaries and
/// action items, renders a shareable report, and optionally posts the
/// result to a Slack channel. The name "Referat" comes from the Norwegian
/// word for "meeting minutes."
#[derive(Parser, Debug)]
#[command(name = "referat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Referat and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Process a meeting recording or transcript
    Process {
        /// Path to a video, audio, or transcript file
        file: String,

        /// Meeting type (general, standup, planning, retrospective)
        #[arg(short, long, default_value = "general")]
        meeting_type: String,

        /// Output file for the report (stdout if "-"; auto-named if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Report format (markdown, json, text)
        #[arg(long, default_value = "markdown")]
        format: String,

        /// Also deliver the results to the configured Slack webhook
        #[arg(long)]
        notify: bool,
    },

    /// Start the HTTP API server for browser front-ends
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
