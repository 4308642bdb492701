//! camflow Media
//!
//! Everything that touches external processes or video files: the ffmpeg
//! frame source, ffprobe lookups, the extraction run that ties a source to
//! the metrics store, and edit decision list export for mpv.

pub mod edl;
pub mod extract;
pub mod probe;
pub mod source;

pub use edl::{EdlPurpose, EditDecisionExporter};
pub use extract::{run_extraction, ExtractionOutcome};
pub use source::{FfmpegFrameSource, FrameSource};
