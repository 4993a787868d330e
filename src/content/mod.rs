//! Content generation and response parsing.

pub mod cache;
pub mod generator;
pub mod model;
pub mod openai;
pub mod parse;
pub mod prompt;
