//! camflow Motion Model
//!
//! Defines the core data contracts shared by extraction and segmentation:
//! - **Geometry:** the fixed analysis crop and its precomputed radial distances
//! - **Frames:** grayscale frames and dense displacement fields
//! - **Samples:** per-frame motion metrics and their on-disk text format
//! - **Intervals:** detected camera-motion spans and edit decision lists
//!
//! Pixel coordinates are row-major with the origin at the top-left corner.

pub mod frame;
pub mod geometry;
pub mod interval;
pub mod sample;

pub use frame::*;
pub use geometry::*;
pub use interval::*;
pub use sample::*;
