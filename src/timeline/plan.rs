use crate::foundation::core::Fps;
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// One still frame's place on the timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slot {
    /// Index of the composed frame shown; `None` for the blank slot of an empty sequence.
    pub frame: Option<usize>,
    pub start_secs: f64,
    pub duration_secs: f64,
    /// First output video frame (inclusive).
    pub start_frame: u64,
    /// Last output video frame (exclusive).
    pub end_frame: u64,
}

impl Slot {
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }

    pub fn frame_span(&self) -> u64 {
        self.end_frame - self.start_frame
    }
}

/// Uniform hard-cut timeline over a fixed total duration.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelinePlan {
    pub slots: Vec<Slot>,
    pub total_secs: f64,
    pub total_frames: u64,
    pub fps: Fps,
}

impl TimelinePlan {
    /// Split `audio_secs` evenly across `frame_count` frames.
    ///
    /// With no frames the timeline is one blank slot lasting `fallback_secs`. Video frame
    /// boundaries are rounded from cumulative times, so `total_frames == round(total * fps)`.
    pub fn uniform(
        frame_count: usize,
        audio_secs: f64,
        fallback_secs: f64,
        fps: Fps,
    ) -> SlidecastResult<Self> {
        if fps.num == 0 || fps.den == 0 {
            return Err(SlidecastError::validation("fps must be non-zero"));
        }

        let (total_secs, slot_count, blank) = if frame_count == 0 {
            (fallback_secs, 1usize, true)
        } else {
            (audio_secs, frame_count, false)
        };
        if !total_secs.is_finite() || total_secs <= 0.0 {
            return Err(SlidecastError::validation(format!(
                "timeline duration must be finite and > 0, got {total_secs}"
            )));
        }

        let per_slot = total_secs / slot_count as f64;
        let boundary = |i: usize| -> f64 {
            if i == slot_count {
                total_secs
            } else {
                per_slot * i as f64
            }
        };

        let slots = (0..slot_count)
            .map(|i| {
                let (start, end) = (boundary(i), boundary(i + 1));
                Slot {
                    frame: (!blank).then_some(i),
                    start_secs: start,
                    duration_secs: end - start,
                    start_frame: fps.secs_to_frames_round(start),
                    end_frame: fps.secs_to_frames_round(end),
                }
            })
            .collect();

        let plan = Self {
            slots,
            total_secs,
            total_frames: fps.secs_to_frames_round(total_secs),
            fps,
        };
        let hidden = plan.hidden_frames().count();
        if hidden > 0 {
            tracing::warn!(
                hidden,
                frames = frame_count,
                total_secs,
                "slots shorter than one video frame; those frames never appear"
            );
        }
        Ok(plan)
    }

    /// Composed frames whose slot rounds to zero video frames.
    pub fn hidden_frames(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .filter(|s| s.frame_span() == 0)
            .filter_map(|s| s.frame)
    }

    /// Slot covering output video frame `index`.
    pub fn slot_at_frame(&self, index: u64) -> Option<&Slot> {
        self.slots
            .iter()
            .find(|s| (s.start_frame..s.end_frame).contains(&index))
    }

    pub fn is_blank(&self) -> bool {
        self.slots.iter().all(|s| s.frame.is_none())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/plan.rs"]
mod tests;
