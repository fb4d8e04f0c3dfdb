//! Library side of the `crosswalk` binary.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
