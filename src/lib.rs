//! slidecast turns a topic into structured educational content and a narrated slideshow video.
//!
//! The flow is:
//!
//! - [`ContentGenerator`] asks a [`TextGenerator`] for JSON and parses the reply into a
//!   [`ContentDocument`], building a fallback document when it does not decode
//! - [`NarrationScript`] flattens the document and a [`NarrationSynthesizer`] speaks it
//! - [`FrameComposer`] renders title, section and summary frames
//! - [`TimelineAssembler`] spreads the frames evenly over the narration and streams them into a
//!   [`FrameSink`]
//!
//! [`Pipeline`] wires all of it together behind `generate_content` / `generate_video`.
#![forbid(unsafe_code)]

mod foundation;

pub mod content;
pub mod encode;
pub mod frame;
pub mod narration;
pub mod pipeline;
pub mod timeline;

pub use crate::foundation::config::{
    CacheConfig, DepthInstructions, FrameConfig, GenerationConfig, NarrationConfig,
    SlidecastConfig, VideoConfig,
};
pub use crate::foundation::core::{Canvas, Fps, Rgb8};
pub use crate::foundation::deadline::{CancelToken, run_with_deadline};
pub use crate::foundation::error::{
    GenerationFailure, SlidecastError, SlidecastResult, SynthesisStage,
};

pub use crate::content::cache::{CacheStatus, ContentCache, Fingerprint};
pub use crate::content::generator::{
    Completion, CompletionRequest, ContentGenerator, GeneratedContent, TextGenerator,
};
pub use crate::content::model::{ContentDocument, ContentRequest, Depth, Section};
pub use crate::content::openai::OpenAiChatClient;
pub use crate::content::parse::{ParseOutcome, ParsedContent, parse_response};
pub use crate::encode::ContainerFormat;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::frame::composer::{Frame, FrameComposer, FrameRole};
pub use crate::frame::palette::{ColorPair, Palette, Style};
pub use crate::frame::text::{
    FontSource, FontSpec, ParleyRasterizer, TextBounds, TextRasterizer, TextSprite,
};
pub use crate::narration::script::NarrationScript;
pub use crate::narration::summary::{ContentSummary, SUMMARY_DEFAULT_MAX_CHARS};
pub use crate::narration::synth::{
    AudioTrack, CommandSynthesizer, NarrationSynthesizer, probe_duration_secs,
};
pub use crate::pipeline::Pipeline;
pub use crate::timeline::assembler::{ArtifactMeta, TimelineAssembler, VideoArtifact};
pub use crate::timeline::plan::{Slot, TimelinePlan};
