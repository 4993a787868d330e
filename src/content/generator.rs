use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::model::{ContentDocument, ContentRequest};
use crate::content::parse::{ParseOutcome, parse_response};
use crate::content::prompt::build_user_prompt;
use crate::foundation::config::GenerationConfig;
use crate::foundation::deadline::run_with_deadline;
use crate::foundation::error::SlidecastResult;
use crate::narration::summary::ContentSummary;

/// One text-generation call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

/// Text-generation result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: u32,
}

/// Text-generation capability.
///
/// A single blocking call; implementations do not retry. Failures are reported as
/// [`crate::SlidecastError::Generation`] (or `Timeout` when the implementation enforces its own
/// bound).
pub trait TextGenerator: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> SlidecastResult<Completion>;
}

/// A generated document plus generation metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub id: Uuid,
    pub document: ContentDocument,
    pub outcome: ParseOutcome,
    pub tokens_used: u32,
    pub created_at: DateTime<Utc>,
}

/// Builds prompts, calls the text-generation capability and parses the answer.
pub struct ContentGenerator {
    backend: Arc<dyn TextGenerator>,
    config: GenerationConfig,
}

impl ContentGenerator {
    pub fn new(backend: Arc<dyn TextGenerator>, config: GenerationConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// The exact request sent for `request`.
    pub fn completion_request(&self, request: &ContentRequest) -> CompletionRequest {
        CompletionRequest {
            system_prompt: self.config.system_prompt.clone(),
            user_prompt: build_user_prompt(request, &self.config.depth_instructions),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Generate a document.
    ///
    /// Capability failures propagate unchanged. A response that does not decode is not a
    /// failure: the result carries a fallback document and `ParseOutcome::Fallback`.
    #[tracing::instrument(skip(self), fields(topic = %request.topic, depth = %request.depth))]
    pub fn generate(&self, request: &ContentRequest) -> SlidecastResult<GeneratedContent> {
        let completion_req = self.completion_request(request);
        let backend = Arc::clone(&self.backend);

        let completion = run_with_deadline("text generation", Some(self.config.timeout()), move || {
            backend.complete(&completion_req)
        })?;
        tracing::debug!(
            tokens_used = completion.tokens_used,
            chars = completion.text.len(),
            "generator responded"
        );

        let parsed = parse_response(&completion.text, request);
        let outcome = parsed.outcome();
        Ok(GeneratedContent {
            id: Uuid::new_v4(),
            document: parsed.into_document(),
            outcome,
            tokens_used: completion.tokens_used,
            created_at: Utc::now(),
        })
    }

    /// Summarize `doc` within the configured character budget.
    pub fn summarize(&self, doc: &ContentDocument) -> ContentSummary {
        ContentSummary::build(doc, self.config.summary_max_chars)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/generator.rs"]
mod tests;
