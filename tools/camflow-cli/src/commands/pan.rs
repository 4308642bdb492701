//! Find sustained pans and export them as an EDL.

use std::path::PathBuf;

use camflow_common::config::AppConfig;
use camflow_metrics_store::MetricsStore;
use camflow_processing_core::pan_segment::{BadFrameScope, PanSegmentConfig, PanSegmenter};
use clap::{Args, ValueEnum};

use super::SegmentOutputArgs;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ScopeArg {
    /// Every run gets the full bad-frame tolerance
    PerRun,
    /// Bad frames seen between runs count against the next one
    Stream,
}

impl From<ScopeArg> for BadFrameScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::PerRun => BadFrameScope::PerRun,
            ScopeArg::Stream => BadFrameScope::Stream,
        }
    }
}

#[derive(Args, Debug)]
pub struct PanArgs {
    /// Videos whose metrics have been extracted
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Target flow angle in degrees (180 = content moving left)
    #[arg(long)]
    pub angle: Option<f64>,

    /// Tolerance around the target angle
    #[arg(long)]
    pub angle_thresh: Option<f64>,

    /// Target flow magnitude
    #[arg(long)]
    pub magnitude: Option<f64>,

    /// Tolerance around the target magnitude
    #[arg(long)]
    pub magnitude_thresh: Option<f64>,

    /// Disable the zoom-factor band check
    #[arg(long)]
    pub no_zoom_gate: bool,

    /// Matching frames a run needs to be kept
    #[arg(long)]
    pub min_frames: Option<u32>,

    /// Non-matching frames tolerated before a run closes
    #[arg(long)]
    pub max_bad_frames: Option<u32>,

    /// When the bad-frame counter resets
    #[arg(long, value_enum)]
    pub bad_frame_scope: Option<ScopeArg>,

    /// Keep a run still open at end of stream
    #[arg(long)]
    pub finalize_at_end: bool,

    #[command(flatten)]
    pub output: SegmentOutputArgs,
}

impl PanArgs {
    fn segment_config(&self, config: &AppConfig) -> PanSegmentConfig {
        let base = PanSegmentConfig::from(&config.pan);
        PanSegmentConfig {
            desired_angle: self.angle.unwrap_or(base.desired_angle),
            angle_thresh: self.angle_thresh.unwrap_or(base.angle_thresh),
            desired_magnitude: self.magnitude.unwrap_or(base.desired_magnitude),
            magnitude_thresh: self.magnitude_thresh.unwrap_or(base.magnitude_thresh),
            zoom_band: if self.no_zoom_gate { None } else { base.zoom_band },
            min_run_frames: self.min_frames.unwrap_or(base.min_run_frames),
            max_tolerated_bad_frames: self.max_bad_frames.unwrap_or(base.max_tolerated_bad_frames),
            bad_frame_scope: self
                .bad_frame_scope
                .map(BadFrameScope::from)
                .unwrap_or(base.bad_frame_scope),
            finalize_open_run_at_end: self.finalize_at_end || base.finalize_open_run_at_end,
        }
    }
}

pub fn run(args: PanArgs, config: &AppConfig) -> anyhow::Result<()> {
    let segmenter = PanSegmenter::new(args.segment_config(config));
    tracing::debug!(config = ?segmenter.config(), "Pan segmentation");

    super::for_each_input(&args.inputs, |input| {
        let samples = MetricsStore::for_video(input).read_all()?;
        let fps = args.output.frame_rate(input)?;
        let intervals = segmenter.segment(&samples, fps, &input.display().to_string());
        args.output.emit(input, &intervals)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camflow_media::edl::EdlPurpose;

    fn args() -> PanArgs {
        PanArgs {
            inputs: vec![PathBuf::from("a.mp4")],
            angle: None,
            angle_thresh: None,
            magnitude: Some(12.0),
            magnitude_thresh: None,
            no_zoom_gate: false,
            min_frames: None,
            max_bad_frames: Some(2),
            bad_frame_scope: None,
            finalize_at_end: false,
            output: SegmentOutputArgs {
                fps: None,
                purpose: EdlPurpose::Preview,
                out_dir: None,
                play: false,
            },
        }
    }

    #[test]
    fn test_unset_flags_fall_back_to_config() {
        let mut config = AppConfig::default();
        config.pan.desired_angle = 0.0;

        let resolved = args().segment_config(&config);
        assert_eq!(resolved.desired_angle, 0.0);
        assert_eq!(resolved.desired_magnitude, 12.0);
        assert_eq!(resolved.max_tolerated_bad_frames, 2);
        assert_eq!(resolved.zoom_band, Some((0.4, 0.7)));
        assert_eq!(resolved.bad_frame_scope, BadFrameScope::PerRun);
    }

    #[test]
    fn test_gate_and_scope_flags() {
        let mut a = args();
        a.no_zoom_gate = true;
        a.bad_frame_scope = Some(ScopeArg::Stream);
        a.finalize_at_end = true;

        let resolved = a.segment_config(&AppConfig::default());
        assert_eq!(resolved.zoom_band, None);
        assert_eq!(resolved.bad_frame_scope, BadFrameScope::Stream);
        assert!(resolved.finalize_open_run_at_end);
    }
}
