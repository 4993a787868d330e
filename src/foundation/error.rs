use std::time::Duration;

/// Crate-wide result alias.
pub type SlidecastResult<T> = Result<T, SlidecastError>;

/// Why a text-generation call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationFailure {
    /// Credentials were rejected by the provider.
    Authentication,
    /// The provider refused the call because of rate limiting.
    RateLimited,
    /// Network / HTTP level failure.
    Transport,
    /// The provider answered, but the response envelope was unusable.
    Response,
}

impl std::fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Authentication => "authentication",
            Self::RateLimited => "rate limited",
            Self::Transport => "transport",
            Self::Response => "response",
        })
    }
}

/// Video pipeline stage at which a synthesis failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthesisStage {
    /// Narration audio synthesis.
    Audio,
    /// Frame rendering.
    Frame,
    /// Video encoding.
    Encode,
}

impl std::fmt::Display for SynthesisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Audio => "audio",
            Self::Frame => "frame",
            Self::Encode => "encode",
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("generation error ({kind}): {message}")]
    Generation {
        kind: GenerationFailure,
        message: String,
    },

    #[error("synthesis error at {stage} stage: {message}")]
    Synthesis {
        stage: SynthesisStage,
        message: String,
    },

    #[error("timeout: {operation} did not finish within {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn generation(kind: GenerationFailure, msg: impl Into<String>) -> Self {
        Self::Generation {
            kind,
            message: msg.into(),
        }
    }

    pub fn synthesis(stage: SynthesisStage, msg: impl Into<String>) -> Self {
        Self::Synthesis {
            stage,
            message: msg.into(),
        }
    }

    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        Self::Timeout { operation, after }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Re-tag any non-synthesis failure as a synthesis failure at `stage`.
    ///
    /// Timeouts and cancellation keep their own variants so callers can still tell them apart.
    pub fn at_stage(self, stage: SynthesisStage) -> Self {
        match self {
            Self::Synthesis { .. } | Self::Timeout { .. } | Self::Cancelled => self,
            other => Self::synthesis(stage, other.to_string()),
        }
    }

    /// Whether retrying the same call later (with backoff) can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Generation {
                    kind: GenerationFailure::RateLimited | GenerationFailure::Transport,
                    ..
                }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
