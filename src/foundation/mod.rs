pub mod config;
pub mod core;
pub mod deadline;
pub mod error;
pub(crate) mod math;
