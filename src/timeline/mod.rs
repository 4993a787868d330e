//! Frame timing and final video assembly.

pub mod assembler;
pub mod plan;
