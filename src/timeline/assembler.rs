use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::encode::ContainerFormat;
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::config::VideoConfig;
use crate::foundation::core::Canvas;
use crate::foundation::deadline::CancelToken;
use crate::foundation::error::{SlidecastError, SlidecastResult, SynthesisStage};
use crate::frame::composer::Frame;
use crate::frame::palette::Style;
use crate::narration::synth::AudioTrack;
use crate::timeline::plan::TimelinePlan;

const MAX_STEM_CHARS: usize = 64;
const MAX_RESERVE_ATTEMPTS: u32 = 1000;

/// A finished video on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoArtifact {
    pub id: Uuid,
    /// `GeneratedContent::id` of the document this video was made from, when known.
    #[serde(default)]
    pub content_id: Option<Uuid>,
    pub topic: String,
    pub title: String,
    pub path: PathBuf,
    pub file_name: String,
    pub duration_secs: f64,
    pub file_size_bytes: u64,
    pub format: ContainerFormat,
    pub style: Style,
    pub created_at: DateTime<Utc>,
}

impl VideoArtifact {
    /// `{prefix}/{file_name}`.
    pub fn url_path(&self, prefix: &str) -> String {
        format!("{}/{}", prefix.trim_end_matches('/'), self.file_name)
    }

    pub fn file_size_mb(&self) -> f64 {
        self.file_size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Descriptive fields of the artifact being assembled.
#[derive(Clone, Debug)]
pub struct ArtifactMeta {
    pub topic: String,
    pub title: String,
    pub style: Style,
    pub content_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ArtifactMeta {
    pub fn now(topic: impl Into<String>, title: impl Into<String>, style: Style) -> Self {
        Self {
            topic: topic.into(),
            title: title.into(),
            style,
            content_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_content_id(mut self, content_id: Uuid) -> Self {
        self.content_id = Some(content_id);
        self
    }
}

/// Reduce a topic to a file-name-safe stem.
///
/// ASCII alphanumerics and `-` are kept; every other run of characters becomes one `_`.
pub fn sanitize_topic(topic: &str) -> String {
    let mut out = String::with_capacity(topic.len());
    for c in topic.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed: String = out.trim_matches('_').chars().take(MAX_STEM_CHARS).collect();
    let trimmed = trimmed.trim_end_matches('_');
    if trimmed.is_empty() {
        "video".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `{sanitized-topic}_{unix-seconds}.{micros}` for `at`.
pub fn output_stem(topic: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{:06}",
        sanitize_topic(topic),
        at.timestamp(),
        at.timestamp_subsec_micros()
    )
}

/// Atomically create an empty output file, adding `-N` to the stem on collision.
pub fn reserve_output_path(
    dir: &Path,
    stem: &str,
    format: ContainerFormat,
) -> SlidecastResult<PathBuf> {
    ensure_parent_dir(&dir.join(stem))?;
    for attempt in 0..MAX_RESERVE_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{stem}.{}", format.extension())
        } else {
            format!("{stem}-{attempt}.{}", format.extension())
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(SlidecastError::synthesis(
                    SynthesisStage::Encode,
                    format!("failed to reserve '{}': {e}", path.display()),
                ));
            }
        }
    }
    Err(SlidecastError::synthesis(
        SynthesisStage::Encode,
        format!("no free output name for '{stem}' in '{}'", dir.display()),
    ))
}

/// Removes a reserved output file unless disarmed.
struct PartialOutput<'a> {
    path: &'a Path,
    armed: bool,
}

impl Drop for PartialOutput<'_> {
    fn drop(&mut self) {
        if self.armed
            && let Err(e) = std::fs::remove_file(self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove partial output");
        }
    }
}

/// Lays frames out over the narration and drives a sink to produce the video file.
#[derive(Clone, Debug)]
pub struct TimelineAssembler {
    config: VideoConfig,
    canvas: Canvas,
}

impl TimelineAssembler {
    pub fn new(config: VideoConfig, canvas: Canvas) -> Self {
        Self { config, canvas }
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    pub fn plan(&self, frame_count: usize, audio_secs: f64) -> SlidecastResult<TimelinePlan> {
        TimelinePlan::uniform(
            frame_count,
            audio_secs,
            self.config.fallback_duration_secs,
            self.config.fps,
        )
    }

    /// Encode `frames` as hard cuts over `audio`.
    ///
    /// The audio track is consumed; scratch audio is removed once encoding is over. On failure
    /// or cancellation the partially written output is deleted.
    #[tracing::instrument(skip_all, fields(frames = frames.len(), topic = %meta.topic))]
    pub fn assemble(
        &self,
        frames: &[Frame],
        audio: AudioTrack,
        meta: ArtifactMeta,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> SlidecastResult<VideoArtifact> {
        cancel.check()?;
        let plan = self
            .plan(frames.len(), audio.duration_secs())
            .map_err(|e| e.at_stage(SynthesisStage::Encode))?;

        let (width, height) = (self.canvas.width, self.canvas.height);
        if let Some(bad) = frames.iter().find(|f| f.image.dimensions() != (width, height)) {
            return Err(SlidecastError::synthesis(
                SynthesisStage::Frame,
                format!(
                    "{:?} frame is {}x{}, canvas is {width}x{height}",
                    bad.role,
                    bad.image.width(),
                    bad.image.height()
                ),
            ));
        }

        let stem = output_stem(&meta.topic, meta.created_at);
        let path = reserve_output_path(&self.config.output_dir, &stem, self.config.format)?;
        let mut guard = PartialOutput {
            path: &path,
            armed: true,
        };

        let sink_cfg = SinkConfig {
            width,
            height,
            fps: self.config.fps,
            format: self.config.format,
            out_path: path.clone(),
            audio: Some(audio.path().to_path_buf()),
            duration_secs: plan.total_secs,
        };
        if let Err(e) = sink.begin(sink_cfg) {
            sink.abort();
            return Err(e.at_stage(SynthesisStage::Encode));
        }
        if let Err(e) = push_timeline(&plan, frames, width, height, sink, cancel) {
            sink.abort();
            if matches!(e, SlidecastError::Cancelled) {
                tracing::info!(path = %path.display(), "video assembly cancelled");
            }
            return Err(e.at_stage(SynthesisStage::Encode));
        }
        sink.end().map_err(|e| e.at_stage(SynthesisStage::Encode))?;
        drop(audio);

        let file_size_bytes = std::fs::metadata(&path)
            .map(|m| m.len())
            .map_err(|e| {
                SlidecastError::synthesis(
                    SynthesisStage::Encode,
                    format!("failed to stat '{}': {e}", path.display()),
                )
            })?;
        guard.armed = false;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let artifact = VideoArtifact {
            id: Uuid::new_v4(),
            content_id: meta.content_id,
            topic: meta.topic,
            title: meta.title,
            path: path.clone(),
            file_name,
            duration_secs: plan.total_secs,
            file_size_bytes,
            format: self.config.format,
            style: meta.style,
            created_at: meta.created_at,
        };
        tracing::info!(
            path = %artifact.path.display(),
            duration_secs = artifact.duration_secs,
            video_frames = plan.total_frames,
            bytes = artifact.file_size_bytes,
            "video assembled"
        );
        Ok(artifact)
    }
}

fn push_timeline(
    plan: &TimelinePlan,
    frames: &[Frame],
    width: u32,
    height: u32,
    sink: &mut dyn FrameSink,
    cancel: &CancelToken,
) -> SlidecastResult<()> {
    let blank = RgbImage::new(width, height);
    for slot in &plan.slots {
        let image = match slot.frame {
            Some(i) => frames.get(i).map(|f| &f.image).ok_or_else(|| {
                SlidecastError::synthesis(SynthesisStage::Frame, format!("no frame at index {i}"))
            })?,
            None => &blank,
        };
        for _ in slot.start_frame..slot.end_frame {
            cancel.check()?;
            sink.push_frame(image)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/assembler.rs"]
mod tests;
