use std::path::PathBuf;

use image::RgbImage;

use crate::encode::ContainerFormat;
use crate::foundation::core::Fps;
use crate::foundation::error::{SlidecastError, SlidecastResult, SynthesisStage};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub format: ContainerFormat,
    /// Destination file. Already reserved by the caller and may exist empty.
    pub out_path: PathBuf,
    /// Audio file muxed as the single audio track.
    pub audio: Option<PathBuf>,
    /// Output is cut at this many seconds.
    pub duration_secs: f64,
}

/// Consumes video frames in timeline order.
///
/// Lifecycle: `begin` once, `push_frame` per output video frame, then exactly one of `end` or
/// `abort`.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> SlidecastResult<()>;
    fn push_frame(&mut self, frame: &RgbImage) -> SlidecastResult<()>;
    fn end(&mut self) -> SlidecastResult<()>;
    /// Stop without finalizing. Must be safe to call in any state.
    fn abort(&mut self);
}

/// In-memory sink for tests and frame dumps.
///
/// Consecutive identical frames are stored once with a repeat count, so a long still slide
/// costs one image.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    runs: Vec<(RgbImage, u64)>,
    finished: bool,
    aborted: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Distinct consecutive frames and how many video frames each spans.
    pub fn runs(&self) -> &[(RgbImage, u64)] {
        &self.runs
    }

    pub fn frame_count(&self) -> u64 {
        self.runs.iter().map(|(_, n)| n).sum()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SlidecastResult<()> {
        self.cfg = Some(cfg);
        self.runs.clear();
        self.finished = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbImage) -> SlidecastResult<()> {
        let Some(cfg) = self.cfg.as_ref() else {
            return Err(SlidecastError::synthesis(
                SynthesisStage::Encode,
                "in-memory sink not started",
            ));
        };
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(SlidecastError::synthesis(
                SynthesisStage::Encode,
                format!(
                    "frame size mismatch: got {}x{}, expected {}x{}",
                    frame.width(),
                    frame.height(),
                    cfg.width,
                    cfg.height
                ),
            ));
        }
        match self.runs.last_mut() {
            Some((last, n)) if last == frame => *n += 1,
            _ => self.runs.push((frame.clone(), 1)),
        }
        Ok(())
    }

    fn end(&mut self) -> SlidecastResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}
