use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::foundation::config::NarrationConfig;
use crate::foundation::error::{SlidecastError, SlidecastResult, SynthesisStage};
use crate::narration::script::NarrationScript;

/// Synthesized narration audio and its length.
///
/// Moved into the assembler, which consumes it exactly once. Tracks created with
/// [`AudioTrack::scratch`] delete their file when dropped.
#[derive(Debug)]
pub struct AudioTrack {
    path: PathBuf,
    duration_secs: f64,
    scratch: bool,
}

impl AudioTrack {
    /// Wrap an existing audio file that the caller keeps ownership of.
    pub fn new(path: impl Into<PathBuf>, duration_secs: f64) -> SlidecastResult<Self> {
        Self::build(path.into(), duration_secs, false)
    }

    /// Wrap a scratch audio file that is removed when the track is dropped.
    pub fn scratch(path: impl Into<PathBuf>, duration_secs: f64) -> SlidecastResult<Self> {
        Self::build(path.into(), duration_secs, true)
    }

    fn build(path: PathBuf, duration_secs: f64, scratch: bool) -> SlidecastResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(SlidecastError::synthesis(
                SynthesisStage::Audio,
                format!("audio duration must be finite and > 0, got {duration_secs}"),
            ));
        }
        Ok(Self {
            path,
            duration_secs,
            scratch,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

impl Drop for AudioTrack {
    fn drop(&mut self) {
        if self.scratch
            && let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove scratch audio");
        }
    }
}

/// Narration-synthesis capability.
pub trait NarrationSynthesizer: Send + Sync {
    /// Synthesize `script` into an audio file placed under `work_dir`.
    fn synthesize(&self, script: &NarrationScript, work_dir: &Path) -> SlidecastResult<AudioTrack>;
}

/// Runs an espeak-compatible TTS executable and probes the result with `ffprobe`.
#[derive(Clone, Debug)]
pub struct CommandSynthesizer {
    config: NarrationConfig,
}

impl CommandSynthesizer {
    pub fn new(config: NarrationConfig) -> Self {
        Self { config }
    }

    fn command_for(&self, script_path: &Path, wav_path: &Path) -> Command {
        let amplitude = (self.config.volume * 100.0).round().clamp(0.0, 200.0) as u32;
        let mut cmd = Command::new(&self.config.command);
        cmd.args(["-s", &self.config.rate_wpm.to_string()])
            .args(["-a", &amplitude.to_string()]);
        if let Some(voice) = self.config.voice.as_deref() {
            cmd.args(["-v", voice]);
        }
        cmd.arg("-w").arg(wav_path).arg("-f").arg(script_path);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }

    fn run(&self, script_path: &Path, wav_path: &Path) -> SlidecastResult<()> {
        let mut child = self.command_for(script_path, wav_path).spawn().map_err(|e| {
            SlidecastError::synthesis(
                SynthesisStage::Audio,
                format!("failed to start TTS command '{}': {e}", self.config.command),
            )
        })?;

        let limit = self.config.timeout();
        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= limit => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SlidecastError::timeout("narration synthesis", limit));
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(20)),
                Err(e) => {
                    return Err(SlidecastError::synthesis(
                        SynthesisStage::Audio,
                        format!("failed to wait for TTS command: {e}"),
                    ));
                }
            }
        };

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                use std::io::Read as _;
                let _ = pipe.read_to_string(&mut stderr);
            }
            return Err(SlidecastError::synthesis(
                SynthesisStage::Audio,
                format!("TTS command exited with {status}: {}", stderr.trim()),
            ));
        }
        Ok(())
    }
}

impl NarrationSynthesizer for CommandSynthesizer {
    #[tracing::instrument(skip(self, script), fields(chars = script.as_str().len()))]
    fn synthesize(&self, script: &NarrationScript, work_dir: &Path) -> SlidecastResult<AudioTrack> {
        if script.is_blank() {
            return Err(SlidecastError::synthesis(
                SynthesisStage::Audio,
                "narration script is empty",
            ));
        }

        std::fs::create_dir_all(work_dir).map_err(|e| {
            SlidecastError::synthesis(
                SynthesisStage::Audio,
                format!("failed to create '{}': {e}", work_dir.display()),
            )
        })?;

        let stem = format!("narration_{}", Uuid::new_v4().simple());
        let script_path = work_dir.join(format!("{stem}.txt"));
        let wav_path = work_dir.join(format!("{stem}.wav"));

        std::fs::write(&script_path, script.as_str()).map_err(|e| {
            SlidecastError::synthesis(
                SynthesisStage::Audio,
                format!("failed to write narration script: {e}"),
            )
        })?;

        let ran = self.run(&script_path, &wav_path);
        let _ = std::fs::remove_file(&script_path);
        if let Err(e) = ran {
            let _ = std::fs::remove_file(&wav_path);
            return Err(e);
        }

        let duration = match probe_duration_secs(&wav_path) {
            Ok(d) => d,
            Err(e) => {
                let _ = std::fs::remove_file(&wav_path);
                return Err(e);
            }
        };
        tracing::info!(path = %wav_path.display(), duration_secs = duration, "narration synthesized");
        AudioTrack::scratch(wav_path, duration)
    }
}

/// Read a media file's duration through `ffprobe`.
pub fn probe_duration_secs(path: &Path) -> SlidecastResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: ProbeFormat,
    }

    let out = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| {
            SlidecastError::synthesis(
                SynthesisStage::Audio,
                format!("failed to run ffprobe: {e}"),
            )
        })?;
    if !out.status.success() {
        return Err(SlidecastError::synthesis(
            SynthesisStage::Audio,
            format!(
                "ffprobe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout).map_err(|e| {
        SlidecastError::synthesis(
            SynthesisStage::Audio,
            format!("ffprobe json parse failed: {e}"),
        )
    })?;
    parsed
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            SlidecastError::synthesis(
                SynthesisStage::Audio,
                format!("ffprobe reported no usable duration for '{}'", path.display()),
            )
        })
}

#[cfg(test)]
#[path = "../../tests/unit/narration/synth.rs"]
mod tests;
