//! camflow Processing Core
//!
//! Turns dense flow into camera-motion decisions:
//! - **Flow:** the [`FlowEngine`] seam and a block-matching implementation
//! - **Metrics:** per-frame magnitude, angle, and zoom factor
//! - **Zoom segmentation:** threshold, pad, merge, and duration filtering
//! - **Pan segmentation:** hysteresis run detection over angle and magnitude
//!
//! This crate is pure computation: no I/O and no subprocesses.
//! All inputs are data; all outputs are data.

pub mod flow;
pub mod metrics;
pub mod pan_segment;
pub mod zoom_segment;

pub use flow::{BlockMatchFlow, FlowEngine};
pub use metrics::MotionMetricExtractor;
pub use pan_segment::PanSegmenter;
pub use zoom_segment::ZoomSegmenter;
