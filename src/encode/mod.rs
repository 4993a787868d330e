//! Encoding sinks.
//!
//! Sinks consume composed frames in timeline order and are driven by the timeline assembler.

/// `ffmpeg`-based sink (mp4/webm output via the system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Output container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    #[default]
    Mp4,
    Webm,
}

impl ContainerFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Webm => "webm",
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ContainerFormat {
    type Err = SlidecastError;

    fn from_str(s: &str) -> SlidecastResult<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp4" => Ok(ContainerFormat::Mp4),
            "webm" => Ok(ContainerFormat::Webm),
            other => Err(SlidecastError::validation(format!(
                "unknown container format '{other}' (expected mp4 or webm)"
            ))),
        }
    }
}
