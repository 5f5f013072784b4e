//! Utility functions and helpers.

pub mod http;
pub mod pause;
pub mod report;

pub use pause::{Pause, TokioPause};
