//! LLM chat completion client.
//!
//! Wraps the OpenAI chat API behind the [`AnswerModel`] trait so the
//! orchestrator can be exercised without network access. Generation is
//! deterministic-leaning: temperature is pinned to zero and the output
//! length is bounded.

use crate::error::{Result, SvarError};
use crate::session::{ChatTurn, Role};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Trait for answer-generating models.
#[async_trait]
pub trait AnswerModel: Send + Sync {
    /// Generate a completion for a system instruction and message sequence.
    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String>;
}

/// OpenAI-backed answer model.
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl OpenAiModel {
    /// Create a model client with a bounded request timeout.
    ///
    /// The API key is read from `OPENAI_API_KEY` by the underlying SDK.
    pub fn new(model: &str, max_tokens: u32, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client: Client::with_config(OpenAIConfig::default()).with_http_client(http_client),
            model: model.to_string(),
            max_tokens,
        }
    }
}

#[async_trait]
impl AnswerModel for OpenAiModel {
    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(turns.len() + 1);

        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| SvarError::Inference(e.to_string()))?
                .into(),
        );

        for turn in turns {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()
                    .map_err(|e| SvarError::Inference(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()
                    .map_err(|e| SvarError::Inference(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| SvarError::Inference(e.to_string()))?;

        debug!("Requesting completion with {} turns", turns.len());

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::Inference(e.to_string()))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SvarError::Inference("Empty response from model".to_string()))?
            .clone();

        Ok(answer)
    }
}
