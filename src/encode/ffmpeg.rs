use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbImage;

use crate::encode::ContainerFormat;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::Fps;
use crate::foundation::error::{SlidecastError, SlidecastResult, SynthesisStage};

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Executable name or path.
    pub program: String,
    /// x264 `-preset` for mp4 output.
    pub x264_preset: String,
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            x264_preset: "medium".to_string(),
        }
    }
}

/// Spawns the system `ffmpeg` and streams raw RGB frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    frames_written: u64,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new(&self.opts.program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // The caller reserves the output path, so it always exists by now.
        cmd.args(["-y", "-loglevel", "error"]);
        cmd.args([
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        if let Some(audio) = cfg.audio.as_ref() {
            cmd.arg("-i").arg(audio);
        }

        match cfg.format {
            ContainerFormat::Mp4 => {
                cmd.args([
                    "-c:v",
                    "libx264",
                    "-preset",
                    &self.opts.x264_preset,
                    "-pix_fmt",
                    "yuv420p",
                ]);
                if cfg.audio.is_some() {
                    cmd.args(["-c:a", "aac"]);
                }
                cmd.args(["-movflags", "+faststart"]);
            }
            ContainerFormat::Webm => {
                cmd.args(["-c:v", "libvpx-vp9", "-pix_fmt", "yuv420p"]);
                if cfg.audio.is_some() {
                    cmd.args(["-c:a", "libopus"]);
                }
            }
        }
        if cfg.audio.is_none() {
            cmd.arg("-an");
        }
        cmd.args(["-t", &format!("{:.3}", cfg.duration_secs)]);
        cmd.args(["-f", cfg.format.extension()]);
        cmd.arg(&cfg.out_path);
        cmd
    }

    fn finish_child(&mut self) -> SlidecastResult<()> {
        let mut child = self.child.take().ok_or_else(|| encode_err("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| encode_err(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| encode_err("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| encode_err(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(encode_err(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> SlidecastResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(encode_err("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(encode_err("ffmpeg sink width/height must be non-zero"));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(encode_err(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if !cfg.duration_secs.is_finite() || cfg.duration_secs <= 0.0 {
            return Err(encode_err("output duration must be finite and > 0"));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && !audio.is_file()
        {
            return Err(SlidecastError::synthesis(
                SynthesisStage::Audio,
                format!("audio input '{}' does not exist", audio.display()),
            ));
        }

        ensure_parent_dir(&cfg.out_path)?;

        let mut cmd = self.command(&cfg);
        tracing::debug!(command = ?cmd, "spawning ffmpeg");
        let mut child = cmd.spawn().map_err(|e| {
            encode_err(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                self.opts.program
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| encode_err("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| encode_err("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbImage) -> SlidecastResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| encode_err("ffmpeg sink not started"))?;
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(encode_err(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(encode_err("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        if let Err(e) = stdin.write_all(frame.as_raw()) {
            // A closed pipe means ffmpeg died; its stderr is the useful part.
            drop(self.stdin.take());
            return match self.finish_child() {
                Err(exit) => Err(exit),
                Ok(()) => Err(encode_err(format!("failed to write frame to ffmpeg stdin: {e}"))),
            };
        }
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> SlidecastResult<()> {
        drop(self.stdin.take());
        self.finish_child()?;
        if let Some(cfg) = self.cfg.take() {
            tracing::debug!(
                path = %cfg.out_path.display(),
                frames = self.frames_written,
                "ffmpeg finished"
            );
        }
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        self.cfg = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn encode_err(message: impl Into<String>) -> SlidecastError {
    SlidecastError::synthesis(SynthesisStage::Encode, message)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SlidecastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
