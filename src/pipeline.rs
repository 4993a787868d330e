//! Outward `generate_content` / `generate_video` interface.
//!
//! A [`Pipeline`] owns one instance of every stage and runs each request as a sequential,
//! blocking workflow: generate (through the cache), then narrate, compose frames and assemble.
//! Concurrent runs share only the content cache; each composes frames with its own composer
//! checked out of a small pool.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::content::cache::{CacheStatus, ContentCache, Fingerprint};
use crate::content::generator::{ContentGenerator, GeneratedContent, TextGenerator};
use crate::content::model::{ContentDocument, ContentRequest, Depth};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::FrameSink;
use crate::foundation::config::SlidecastConfig;
use crate::foundation::deadline::{CancelToken, run_with_deadline};
use crate::foundation::error::{SlidecastResult, SynthesisStage};
use crate::frame::composer::{Frame, FrameComposer};
use crate::frame::palette::Style;
use crate::frame::text::{ParleyRasterizer, TextRasterizer};
use crate::narration::script::NarrationScript;
use crate::narration::synth::NarrationSynthesizer;
use crate::timeline::assembler::{ArtifactMeta, TimelineAssembler, VideoArtifact};

type BoxedRasterizer = Box<dyn TextRasterizer + Send>;
type RasterizerFactory = dyn Fn() -> BoxedRasterizer + Send + Sync;

/// End-to-end content and video generation.
pub struct Pipeline {
    config: SlidecastConfig,
    generator: ContentGenerator,
    cache: Option<ContentCache>,
    narrator: Arc<dyn NarrationSynthesizer>,
    idle_composers: Mutex<Vec<FrameComposer<BoxedRasterizer>>>,
    new_rasterizer: Box<RasterizerFactory>,
    assembler: TimelineAssembler,
    work_dir: PathBuf,
}

impl Pipeline {
    /// Build a pipeline using the Parley text rasterizer.
    pub fn new(
        config: SlidecastConfig,
        generator: Arc<dyn TextGenerator>,
        narrator: Arc<dyn NarrationSynthesizer>,
    ) -> SlidecastResult<Self> {
        let font_path = config.frames.font_path.clone();
        Self::with_rasterizer(config, generator, narrator, move || {
            let rasterizer = ParleyRasterizer::new(font_path.as_deref());
            tracing::debug!(font = ?rasterizer.font_source(), "text rasterizer ready");
            rasterizer
        })
    }

    /// Build a pipeline whose frame composers get their rasterizer from `new_rasterizer`.
    ///
    /// The factory runs once per composer; composers are reused across runs.
    pub fn with_rasterizer<R, F>(
        config: SlidecastConfig,
        generator: Arc<dyn TextGenerator>,
        narrator: Arc<dyn NarrationSynthesizer>,
        new_rasterizer: F,
    ) -> SlidecastResult<Self>
    where
        R: TextRasterizer + Send + 'static,
        F: Fn() -> R + Send + Sync + 'static,
    {
        config.validate()?;
        let cache = config
            .cache
            .enabled
            .then(|| ContentCache::new(config.cache.ttl()));
        let work_dir = config.video.output_dir.join(".work");
        Ok(Self {
            generator: ContentGenerator::new(generator, config.generation.clone()),
            cache,
            narrator,
            idle_composers: Mutex::new(Vec::new()),
            new_rasterizer: Box::new(move || Box::new(new_rasterizer()) as BoxedRasterizer),
            assembler: TimelineAssembler::new(config.video.clone(), config.frames.canvas),
            work_dir,
            config,
        })
    }

    pub fn config(&self) -> &SlidecastConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&ContentCache> {
        self.cache.as_ref()
    }

    /// Generate (or reuse cached) content for a topic.
    #[tracing::instrument(skip(self), fields(cache = tracing::field::Empty))]
    pub fn generate_content(
        &self,
        topic: &str,
        language: &str,
        depth: Depth,
    ) -> SlidecastResult<Arc<GeneratedContent>> {
        let request = ContentRequest::new(topic, language, depth)?;
        let Some(cache) = self.cache.as_ref() else {
            tracing::Span::current().record("cache", "disabled");
            return self.generator.generate(&request).map(Arc::new);
        };

        let key = Fingerprint::of(&request);
        let (content, status) =
            cache.get_or_try_insert_with(key, || self.generator.generate(&request))?;
        tracing::Span::current().record(
            "cache",
            match status {
                CacheStatus::Hit => "hit",
                CacheStatus::Miss => "miss",
            },
        );
        Ok(content)
    }

    /// Render frames for `doc` without narrating or encoding.
    pub fn compose_frames(&self, doc: &ContentDocument, style: Style) -> SlidecastResult<Vec<Frame>> {
        let idle = self.idle_composers.lock().pop();
        let mut composer = match idle {
            Some(composer) => composer,
            None => FrameComposer::new(self.config.frames.clone(), (self.new_rasterizer)()),
        };
        let frames = composer.compose(doc, style);
        self.idle_composers.lock().push(composer);
        frames
    }

    /// Produce a narrated video of `doc` with the `ffmpeg` sink.
    pub fn generate_video(&self, doc: &ContentDocument, style: Style) -> SlidecastResult<VideoArtifact> {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
        self.generate_video_with(doc, None, style, &mut sink, &CancelToken::new())
    }

    /// Like [`Pipeline::generate_video`], linking the artifact to the content it came from.
    pub fn generate_video_for(
        &self,
        content: &GeneratedContent,
        style: Style,
    ) -> SlidecastResult<VideoArtifact> {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
        self.generate_video_with(
            &content.document,
            Some(content.id),
            style,
            &mut sink,
            &CancelToken::new(),
        )
    }

    /// Produce a narrated video, streaming frames into `sink`.
    #[tracing::instrument(skip_all, fields(topic = %doc.topic, %style, sections = doc.sections.len()))]
    pub fn generate_video_with(
        &self,
        doc: &ContentDocument,
        content_id: Option<Uuid>,
        style: Style,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> SlidecastResult<VideoArtifact> {
        let script = NarrationScript::build(doc);
        let narrator = Arc::clone(&self.narrator);
        let work_dir = self.work_dir.clone();
        let audio = run_with_deadline(
            "narration synthesis",
            Some(self.config.narration.timeout()),
            move || narrator.synthesize(&script, &work_dir),
        )
        .map_err(|e| e.at_stage(SynthesisStage::Audio))?;
        cancel.check()?;

        let frames = self.compose_frames(doc, style)?;
        cancel.check()?;

        let mut meta = ArtifactMeta::now(doc.topic.clone(), doc.title.clone(), style);
        meta.content_id = content_id;
        self.assembler.assemble(&frames, audio, meta, sink, cancel)
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
