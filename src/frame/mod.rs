//! Still-frame composition.

pub mod composer;
pub mod palette;
pub mod text;
