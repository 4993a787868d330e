//! Explicit configuration handed to each component at construction.
//!
//! Nothing in the library reads process environment. Every section deserializes with per-field
//! defaults, so a config file only needs the keys it overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::content::model::Depth;
use crate::encode::ContainerFormat;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::narration::summary::SUMMARY_DEFAULT_MAX_CHARS;

const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert educational content creator. Create \
comprehensive, engaging, and accurate learning materials.";

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidecastConfig {
    pub generation: GenerationConfig,
    pub narration: NarrationConfig,
    pub frames: FrameConfig,
    pub video: VideoConfig,
    pub cache: CacheConfig,
}

impl SlidecastConfig {
    /// Load and validate a JSON config file.
    pub fn from_path(path: &Path) -> SlidecastResult<Self> {
        use anyhow::Context as _;
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn from_json_str(s: &str) -> SlidecastResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| SlidecastError::config(format!("invalid config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> SlidecastResult<()> {
        self.generation.validate()?;
        self.narration.validate()?;
        self.frames.validate()?;
        self.video.validate()?;
        Ok(())
    }
}

/// Fixed natural-language directive per [`Depth`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthInstructions {
    pub basic: String,
    pub intermediate: String,
    pub advanced: String,
}

impl DepthInstructions {
    pub fn for_depth(&self, depth: Depth) -> &str {
        match depth {
            Depth::Basic => &self.basic,
            Depth::Intermediate => &self.intermediate,
            Depth::Advanced => &self.advanced,
        }
    }
}

impl Default for DepthInstructions {
    fn default() -> Self {
        Self {
            basic: "Cover fundamentals only, simple language suitable for beginners".into(),
            intermediate:
                "Cover key concepts with some depth, suitable for learners with basic knowledge"
                    .into(),
            advanced:
                "Provide comprehensive coverage with advanced concepts and technical details"
                    .into(),
        }
    }
}

/// Text-generation request parameters. Fixed per process, never varied per call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    /// Base URL of an OpenAI-compatible API.
    pub endpoint: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub system_prompt: String,
    pub depth_instructions: DepthInstructions,
    /// Character budget of content summaries.
    pub summary_max_chars: usize,
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> SlidecastResult<()> {
        if self.model.trim().is_empty() {
            return Err(SlidecastError::config("generation.model must be non-empty"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(SlidecastError::config(
                "generation.temperature must be within [0, 2]",
            ));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(SlidecastError::config("generation.top_p must be within (0, 1]"));
        }
        if self.max_tokens == 0 {
            return Err(SlidecastError::config("generation.max_tokens must be > 0"));
        }
        if self.timeout_secs == 0 {
            return Err(SlidecastError::config("generation.timeout_secs must be > 0"));
        }
        if self.summary_max_chars == 0 {
            return Err(SlidecastError::config("generation.summary_max_chars must be > 0"));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            endpoint: "https://api.openai.com".into(),
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 2000,
            timeout_secs: 120,
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            depth_instructions: DepthInstructions::default(),
            summary_max_chars: SUMMARY_DEFAULT_MAX_CHARS,
        }
    }
}

/// External TTS command settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// espeak-compatible executable (`-s`, `-a`, `-v`, `-w`, `-f` flags).
    pub command: String,
    pub voice: Option<String>,
    /// Speaking rate in words per minute.
    pub rate_wpm: u32,
    /// Volume in `[0, 1]`.
    pub volume: f32,
    pub timeout_secs: u64,
}

impl NarrationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> SlidecastResult<()> {
        if self.command.trim().is_empty() {
            return Err(SlidecastError::config("narration.command must be non-empty"));
        }
        if self.rate_wpm == 0 {
            return Err(SlidecastError::config("narration.rate_wpm must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(SlidecastError::config("narration.volume must be within [0, 1]"));
        }
        if self.timeout_secs == 0 {
            return Err(SlidecastError::config("narration.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            command: "espeak-ng".into(),
            voice: None,
            rate_wpm: 150,
            volume: 0.9,
            timeout_secs: 300,
        }
    }
}

/// Frame layout settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub canvas: Canvas,
    /// Preferred font file. Missing or unreadable files fall back to a system face.
    pub font_path: Option<PathBuf>,
    pub title_font_px: f32,
    pub section_font_px: f32,
    pub summary_font_px: f32,
    /// Horizontal margin kept free on each side when wrapping text.
    pub margin_px: u32,
}

impl FrameConfig {
    fn validate(&self) -> SlidecastResult<()> {
        self.canvas
            .validate()
            .map_err(|e| SlidecastError::config(format!("frames.canvas: {e}")))?;
        for (name, px) in [
            ("title_font_px", self.title_font_px),
            ("section_font_px", self.section_font_px),
            ("summary_font_px", self.summary_font_px),
        ] {
            if !px.is_finite() || px <= 0.0 {
                return Err(SlidecastError::config(format!(
                    "frames.{name} must be finite and > 0"
                )));
            }
        }
        if self.margin_px.saturating_mul(2) >= self.canvas.width {
            return Err(SlidecastError::config(
                "frames.margin_px leaves no room for text",
            ));
        }
        Ok(())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::HD_1080,
            font_path: Some(PathBuf::from(
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            )),
            title_font_px: 80.0,
            section_font_px: 40.0,
            summary_font_px: 50.0,
            margin_px: 96,
        }
    }
}

/// Assembly and output settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub output_dir: PathBuf,
    pub fps: Fps,
    pub format: ContainerFormat,
    /// Total duration used when there are no frames to divide the audio across.
    pub fallback_duration_secs: f64,
    /// Prefix external consumers use to build retrieval URLs.
    pub public_url_prefix: String,
}

impl VideoConfig {
    fn validate(&self) -> SlidecastResult<()> {
        Fps::new(self.fps.num, self.fps.den)
            .map_err(|e| SlidecastError::config(format!("video.fps: {e}")))?;
        if !self.fallback_duration_secs.is_finite() || self.fallback_duration_secs <= 0.0 {
            return Err(SlidecastError::config(
                "video.fallback_duration_secs must be finite and > 0",
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(SlidecastError::config("video.output_dir must be non-empty"));
        }
        Ok(())
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs/videos"),
            fps: Fps::default(),
            format: ContainerFormat::Mp4,
            fallback_duration_secs: 5.0,
            public_url_prefix: "/outputs/videos".into(),
        }
    }
}

/// Content cache settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Entry lifetime. `None` keeps entries until cleared.
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: Some(300),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
