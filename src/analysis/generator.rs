//! Text generation seam for the analyzer.

use crate::error::{ReferatError, Result};
use crate::openai::create_client;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Trait for text generation services.
///
/// The analyzer talks to the model through this seam so tests can substitute
/// a double that records prompts and returns canned output.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// OpenAI chat-completion generator.
pub struct OpenAiGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiGenerator {
    /// Create a generator with custom configuration.
    pub fn with_config(model: &str, temperature: f32, timeout_seconds: u64) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            temperature,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.to_string())
            .build()
            .map_err(|e| ReferatError::ModelUnavailable(format!("Failed to build request: {}", e)))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .temperature(self.temperature)
            .build()
            .map_err(|e| ReferatError::ModelUnavailable(format!("Failed to build request: {}", e)))?;

        // The configured ceiling is the contract for ModelTimeout; the shared
        // HTTP client timeout is only a backstop.
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| ReferatError::ModelTimeout(self.timeout.as_secs()))?
            .map_err(|e| ReferatError::ModelUnavailable(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ReferatError::MalformedResponse("empty completion".to_string()))?;

        debug!("Generated {} characters", content.len());
        Ok(content)
    }
}
