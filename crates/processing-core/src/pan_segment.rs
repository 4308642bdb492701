//! Pan segmentation: a hysteresis run detector.
//!
//! A run opens on the first matching sample, counts further matches, and
//! closes once more than `max_tolerated_bad_frames` non-matching samples have
//! been seen. A closed run is emitted when it collected at least
//! `min_run_frames` matches, spanning from its first frame to the frame before
//! the one that closed it.

use camflow_common::config::PanDefaults;
use camflow_common::framerate::FrameRate;
use camflow_motion_model::interval::Interval;
use camflow_motion_model::sample::FlowSample;

/// When the bad-frame counter is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadFrameScope {
    /// Cleared when a run opens and when a run closes. Each run gets the full
    /// tolerance.
    #[default]
    PerRun,
    /// Cleared only when a close triggers. Non-matching samples seen while
    /// idle count against the next run.
    Stream,
}

/// Configuration for the pan segmenter.
#[derive(Debug, Clone, PartialEq)]
pub struct PanSegmentConfig {
    /// Target median flow angle (degrees).
    pub desired_angle: f64,
    /// Exclusive tolerance around `desired_angle`.
    pub angle_thresh: f64,
    /// Target median flow magnitude.
    pub desired_magnitude: f64,
    /// Exclusive tolerance around `desired_magnitude`.
    pub magnitude_thresh: f64,
    /// Exclusive `(low, high)` band the zoom factor must sit in, to reject
    /// pans that coincide with a zoom. `None` disables the gate.
    pub zoom_band: Option<(f64, f64)>,
    /// Matches a run needs to be emitted.
    pub min_run_frames: u32,
    /// Non-matching samples tolerated before a run closes.
    pub max_tolerated_bad_frames: u32,
    pub bad_frame_scope: BadFrameScope,
    /// Treat end of stream as a close event for an open run.
    pub finalize_open_run_at_end: bool,
}

impl Default for PanSegmentConfig {
    fn default() -> Self {
        Self::from(&PanDefaults::default())
    }
}

impl From<&PanDefaults> for PanSegmentConfig {
    fn from(d: &PanDefaults) -> Self {
        Self {
            desired_angle: d.desired_angle,
            angle_thresh: d.angle_thresh,
            desired_magnitude: d.desired_magnitude,
            magnitude_thresh: d.magnitude_thresh,
            zoom_band: d.zoom_band,
            min_run_frames: d.min_run_frames,
            max_tolerated_bad_frames: d.max_tolerated_bad_frames,
            bad_frame_scope: if d.reset_bad_frames_per_run {
                BadFrameScope::PerRun
            } else {
                BadFrameScope::Stream
            },
            finalize_open_run_at_end: d.finalize_open_run_at_end,
        }
    }
}

impl PanSegmentConfig {
    /// Whether a sample matches the pan bands.
    pub fn matches(&self, sample: &FlowSample) -> bool {
        let angle_ok = (sample.angle_degrees - self.desired_angle).abs() < self.angle_thresh;
        let magnitude_ok =
            (sample.magnitude - self.desired_magnitude).abs() < self.magnitude_thresh;
        let zoom_ok = match self.zoom_band {
            Some((low, high)) => sample.zoom_factor > low && sample.zoom_factor < high,
            None => true,
        };
        angle_ok && magnitude_ok && zoom_ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running { start_frame: u64, hits: u32 },
}

/// An emitted run, as an inclusive frame range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRun {
    pub start_frame: u64,
    pub end_frame: u64,
    pub hits: u32,
}

/// Streaming state machine behind [`PanSegmenter`].
#[derive(Debug)]
pub struct PanRunDetector<'a> {
    config: &'a PanSegmentConfig,
    state: RunState,
    bad_frames: u32,
    last_frame: Option<u64>,
}

impl<'a> PanRunDetector<'a> {
    pub fn new(config: &'a PanSegmentConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
            bad_frames: 0,
            last_frame: None,
        }
    }

    /// Feed the next sample; returns a run if this sample closed one.
    pub fn push(&mut self, sample: &FlowSample) -> Option<FrameRun> {
        self.last_frame = Some(sample.frame_index);

        if self.config.matches(sample) {
            match self.state {
                RunState::Idle => {
                    self.state = RunState::Running {
                        start_frame: sample.frame_index,
                        hits: 1,
                    };
                    if self.config.bad_frame_scope == BadFrameScope::PerRun {
                        self.bad_frames = 0;
                    }
                }
                RunState::Running { ref mut hits, .. } => *hits += 1,
            }
            return None;
        }

        self.bad_frames += 1;
        if self.bad_frames <= self.config.max_tolerated_bad_frames {
            return None;
        }

        let closed = self.close(sample.frame_index.saturating_sub(1));
        self.bad_frames = 0;
        closed
    }

    /// End-of-stream event. Emits the open run only when configured to.
    pub fn finish(mut self) -> Option<FrameRun> {
        if !self.config.finalize_open_run_at_end {
            if let RunState::Running { start_frame, hits } = self.state {
                tracing::debug!(start_frame, hits, "Open pan run dropped at end of stream");
            }
            return None;
        }
        let last = self.last_frame?;
        self.close(last)
    }

    fn close(&mut self, end_frame: u64) -> Option<FrameRun> {
        let state = std::mem::replace(&mut self.state, RunState::Idle);
        match state {
            RunState::Running { start_frame, hits } if hits >= self.config.min_run_frames => {
                Some(FrameRun {
                    start_frame,
                    end_frame,
                    hits,
                })
            }
            _ => None,
        }
    }
}

/// Detects sustained pans in a stored sample series.
pub struct PanSegmenter {
    config: PanSegmentConfig,
}

impl PanSegmenter {
    pub fn new(config: PanSegmentConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(PanSegmentConfig::default())
    }

    pub fn config(&self) -> &PanSegmentConfig {
        &self.config
    }

    /// Emitted runs as frame ranges, in stream order.
    pub fn detect_runs(&self, samples: &[FlowSample]) -> Vec<FrameRun> {
        let mut detector = PanRunDetector::new(&self.config);
        let mut runs: Vec<FrameRun> = samples.iter().filter_map(|s| detector.push(s)).collect();
        runs.extend(detector.finish());
        runs
    }

    /// Segment `samples` into chronological intervals of `source`.
    pub fn segment(&self, samples: &[FlowSample], fps: FrameRate, source: &str) -> Vec<Interval> {
        let runs = self.detect_runs(samples);
        let intervals: Vec<Interval> = runs
            .iter()
            .filter_map(|run| {
                let start = fps.frame_to_secs(run.start_frame);
                let end = fps.frame_to_secs(run.end_frame);
                let interval = Interval::new(start, end, source);
                if interval.is_none() {
                    tracing::debug!(
                        start_frame = run.start_frame,
                        end_frame = run.end_frame,
                        "Skipping zero-length pan run"
                    );
                }
                interval
            })
            .collect();

        tracing::debug!(
            source,
            samples = samples.len(),
            runs = runs.len(),
            kept = intervals.len(),
            "Pan segmentation complete"
        );

        intervals
    }
}
