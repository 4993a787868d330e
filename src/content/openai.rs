//! OpenAI-compatible chat-completions client implementing [`TextGenerator`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::content::generator::{Completion, CompletionRequest, TextGenerator};
use crate::foundation::config::GenerationConfig;
use crate::foundation::error::{GenerationFailure, SlidecastError, SlidecastResult};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

/// Blocking client for `POST {endpoint}/v1/chat/completions`.
pub struct OpenAiChatClient {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiChatClient {
    pub fn new(api_key: impl Into<String>, config: &GenerationConfig) -> SlidecastResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SlidecastError::generation(
                GenerationFailure::Authentication,
                "API key must be non-empty",
            ));
        }
        let timeout = config.timeout();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SlidecastError::generation(
                    GenerationFailure::Transport,
                    format!("failed to build HTTP client: {e}"),
                )
            })?;
        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint)
    }
}

impl TextGenerator for OpenAiChatClient {
    fn complete(&self, request: &CompletionRequest) -> SlidecastResult<Completion> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .unwrap_or_else(|_| "<unreadable error body>".to_string());
            tracing::error!(status = status.as_u16(), "chat completion failed");
            return Err(SlidecastError::generation(
                classify_status(status.as_u16()),
                format!("HTTP {status}: {}", text.trim()),
            ));
        }

        let parsed: ChatResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                return SlidecastError::timeout("text generation", self.timeout);
            }
            SlidecastError::generation(
                GenerationFailure::Response,
                format!("failed to decode chat completion: {e}"),
            )
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                SlidecastError::generation(
                    GenerationFailure::Response,
                    "chat completion contained no message content",
                )
            })?;

        Ok(Completion {
            text,
            tokens_used: parsed.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }
}

impl OpenAiChatClient {
    fn transport_error(&self, e: reqwest::Error) -> SlidecastError {
        if e.is_timeout() {
            SlidecastError::timeout("text generation", self.timeout)
        } else {
            SlidecastError::generation(GenerationFailure::Transport, e.to_string())
        }
    }
}

/// Map an HTTP failure status to a failure kind.
pub(crate) fn classify_status(status: u16) -> GenerationFailure {
    match status {
        401 | 403 => GenerationFailure::Authentication,
        429 => GenerationFailure::RateLimited,
        _ => GenerationFailure::Transport,
    }
}
