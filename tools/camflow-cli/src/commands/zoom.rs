//! Find zoom-in segments and export them as an EDL.

use std::path::PathBuf;

use camflow_common::config::AppConfig;
use camflow_metrics_store::MetricsStore;
use camflow_processing_core::zoom_segment::{ZoomSegmentConfig, ZoomSegmenter};
use clap::Args;

use super::SegmentOutputArgs;

#[derive(Args, Debug)]
pub struct ZoomArgs {
    /// Videos whose metrics have been extracted
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Zoom factor a frame must exceed
    #[arg(long)]
    pub min_zoom_in: Option<f64>,

    /// Median flow magnitude a frame must exceed
    #[arg(long)]
    pub min_magnitude: Option<f64>,

    /// Minimum segment length after merging (seconds)
    #[arg(long)]
    pub min_duration: Option<f64>,

    /// Lead-in before each zooming frame (seconds)
    #[arg(long)]
    pub pad_before: Option<f64>,

    /// Tail after each zooming frame (seconds)
    #[arg(long)]
    pub pad_after: Option<f64>,

    #[command(flatten)]
    pub output: SegmentOutputArgs,
}

impl ZoomArgs {
    fn segment_config(&self, config: &AppConfig) -> ZoomSegmentConfig {
        let base = ZoomSegmentConfig::from(&config.zoom);
        ZoomSegmentConfig {
            min_zoom_in: self.min_zoom_in.unwrap_or(base.min_zoom_in),
            min_magnitude: self.min_magnitude.unwrap_or(base.min_magnitude),
            min_duration_secs: self.min_duration.unwrap_or(base.min_duration_secs),
            pad_before_secs: self.pad_before.unwrap_or(base.pad_before_secs),
            pad_after_secs: self.pad_after.unwrap_or(base.pad_after_secs),
        }
    }
}

pub fn run(args: ZoomArgs, config: &AppConfig) -> anyhow::Result<()> {
    let segmenter = ZoomSegmenter::new(args.segment_config(config));
    tracing::debug!(config = ?segmenter.config(), "Zoom segmentation");

    super::for_each_input(&args.inputs, |input| {
        let samples = MetricsStore::for_video(input).read_all()?;
        let fps = args.output.frame_rate(input)?;
        let intervals = segmenter.segment(&samples, fps, &input.display().to_string());
        args.output.emit(input, &intervals)
    })
}
