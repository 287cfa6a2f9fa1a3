//! Schema module - Configuration, puzzle and result types for benchmark runs.

mod config;
mod puzzle;
mod result;

pub use config::*;
pub use puzzle::*;
pub use result::*;
