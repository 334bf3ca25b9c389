//! Shared OpenAI client construction.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Transport-level timeout for OpenAI requests (10 minutes).
///
/// Transcribing a long recording is the slowest call this client makes; the
/// analyzer enforces its own, much tighter per-request ceiling on top.
const HTTP_TIMEOUT: Duration = Duration::from_secs(600);

/// Create an OpenAI client backed by a timeout-bounded HTTP client.
///
/// Reads `OPENAI_API_KEY` from the environment.
pub fn create_client() -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}
