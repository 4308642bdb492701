//! Zoom-in segmentation.
//!
//! # Algorithm
//!
//! 1. **Hit** test per sample: `zoom_factor > min_zoom_in` and
//!    `magnitude > min_magnitude`.
//! 2. **Pad** every hit at time `t` into a candidate `[t - pad_before, t + pad_after]`.
//! 3. **Merge** left to right in one pass: a candidate starting at or before
//!    the previous span's end extends that span; otherwise it opens a new one.
//! 4. **Filter** spans shorter than `min_duration_secs`.
//!
//! Merging and filtering work on the unclamped spans, so every candidate
//! counts with its full padded length. Only the emitted interval's start is
//! clamped at zero; ends are never clamped to the media length.

use camflow_common::config::ZoomDefaults;
use camflow_common::framerate::FrameRate;
use camflow_motion_model::interval::Interval;
use camflow_motion_model::sample::FlowSample;

/// Configuration for the zoom segmenter.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomSegmentConfig {
    /// Zoom factor a frame must exceed to count as zooming in.
    pub min_zoom_in: f64,

    /// Median magnitude a frame must exceed (pixels per frame).
    pub min_magnitude: f64,

    /// Spans shorter than this are dropped after merging (seconds).
    pub min_duration_secs: f64,

    /// Lead-in added before every hit (seconds).
    pub pad_before_secs: f64,

    /// Tail added after every hit (seconds).
    pub pad_after_secs: f64,
}

impl Default for ZoomSegmentConfig {
    fn default() -> Self {
        Self::from(&ZoomDefaults::default())
    }
}

impl From<&ZoomDefaults> for ZoomSegmentConfig {
    fn from(d: &ZoomDefaults) -> Self {
        Self {
            min_zoom_in: d.min_zoom_in,
            min_magnitude: d.min_magnitude,
            min_duration_secs: d.min_duration_secs,
            pad_before_secs: d.pad_before_secs,
            pad_after_secs: d.pad_after_secs,
        }
    }
}

/// Detects zoom-in spans in a stored sample series.
pub struct ZoomSegmenter {
    config: ZoomSegmentConfig,
}

impl ZoomSegmenter {
    pub fn new(config: ZoomSegmentConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ZoomSegmentConfig::default())
    }

    pub fn config(&self) -> &ZoomSegmentConfig {
        &self.config
    }

    /// Whether a single sample counts as zooming in.
    pub fn is_hit(&self, sample: &FlowSample) -> bool {
        sample.zoom_factor > self.config.min_zoom_in && sample.magnitude > self.config.min_magnitude
    }

    /// Segment `samples` into chronological, non-overlapping intervals of
    /// `source`.
    pub fn segment(&self, samples: &[FlowSample], fps: FrameRate, source: &str) -> Vec<Interval> {
        let mut spans: Vec<(f64, f64)> = Vec::new();
        let mut hits = 0usize;

        for sample in samples.iter().filter(|s| self.is_hit(s)) {
            hits += 1;
            let t = fps.frame_to_secs(sample.frame_index);
            let start = t - self.config.pad_before_secs;
            let end = t + self.config.pad_after_secs;

            match spans.last_mut() {
                Some(last) if start <= last.1 => {
                    if end > last.1 {
                        last.1 = end;
                    }
                }
                _ => spans.push((start, end)),
            }
        }

        let merged = spans.len();
        let intervals: Vec<Interval> = spans
            .into_iter()
            .filter(|(start, end)| end - start >= self.config.min_duration_secs)
            .filter_map(|(start, end)| Interval::new(start.max(0.0), end, source))
            .collect();

        tracing::debug!(
            source,
            samples = samples.len(),
            hits,
            merged,
            kept = intervals.len(),
            "Zoom segmentation complete"
        );

        intervals
    }
}
