//! Mistral chat-completions answer model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::Chunk;
use crate::error::{RagError, Result};
use crate::llm::{stuff_context, AnswerModel};

/// The Mistral chat completions endpoint.
const MISTRAL_CHAT_URL: &str = "https://api.mistral.ai/v1/chat/completions";

/// The default chat model.
const DEFAULT_MODEL: &str = "mistral-large-latest";

const SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer the question using only the \
provided context passages. If the context does not contain the answer, say so.";

/// An [`AnswerModel`] backed by the Mistral chat completions API.
///
/// # Configuration
///
/// - `model` – defaults to `mistral-large-latest`.
/// - `api_key` – from the constructor or the `MISTRAL_API_KEY` environment
///   variable.
pub struct MistralAnswerModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl MistralAnswerModel {
    /// Create a new model client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Config("Mistral API key must not be empty".into()));
        }

        Ok(Self { client: reqwest::Client::new(), api_key, model: DEFAULT_MODEL.into() })
    }

    /// Create a new model client using the `MISTRAL_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("MISTRAL_API_KEY")
            .map_err(|_| RagError::Config("MISTRAL_API_KEY environment variable not set".into()))?;
        Self::new(api_key)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn upstream(message: impl Into<String>) -> RagError {
        RagError::UpstreamFailure { stage: "llm".into(), message: message.into() }
    }
}

// ── Mistral API request/response types ─────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl AnswerModel for MistralAnswerModel {
    async fn answer(&self, question: &str, context: &[Chunk]) -> Result<String> {
        let context_block = stuff_context(context);
        let user_prompt = format!("Context:\n{context_block}\n\nQuestion: {question}");

        debug!(model = %self.model, context_chunks = context.len(), "requesting answer");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &user_prompt },
            ],
        };

        let response = self
            .client
            .post(MISTRAL_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "chat request failed");
                Self::upstream(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(model = %self.model, %status, "chat API error");
            return Err(Self::upstream(format!("API returned {status}: {body}")));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            error!(model = %self.model, error = %e, "failed to parse chat response");
            Self::upstream(format!("failed to parse response: {e}"))
        })?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| Self::upstream("API returned no choices"))
    }
}
