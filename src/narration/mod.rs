//! Narration script building, speech synthesis and plain-text summaries.

pub mod script;
pub mod summary;
pub mod synth;
