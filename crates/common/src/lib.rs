//! camflow Common Utilities
//!
//! Shared infrastructure for all camflow crates:
//! - Error taxonomy and result aliases
//! - Frame-rate parsing and frame/time conversion
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod framerate;
pub mod logging;

pub use config::*;
pub use error::*;
pub use framerate::*;
