//! Extract per-frame motion metrics from videos.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use camflow_common::config::AppConfig;
use camflow_media::extract::{run_extraction, ExtractionOutcome};
use camflow_media::source::FfmpegFrameSource;
use camflow_metrics_store::MetricsStore;
use camflow_motion_model::sample::FlowSample;
use camflow_processing_core::flow::{BlockMatchConfig, BlockMatchFlow};
use clap::Args;

use crate::preview::RollingWindow;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Videos to analyze
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Log a rolling average of zoom, angle, and magnitude for every frame
    #[arg(long)]
    pub preview: bool,

    /// Analysis region width (pixels, centered)
    #[arg(long)]
    pub crop_width: Option<usize>,

    /// Analysis region height (pixels, centered)
    #[arg(long)]
    pub crop_height: Option<usize>,

    /// Block size for block-matching flow
    #[arg(long)]
    pub block_size: Option<usize>,

    /// Search range for block-matching flow (pixels)
    #[arg(long)]
    pub search_range: Option<usize>,
}

pub fn run(args: ExtractArgs, config: &AppConfig) -> anyhow::Result<()> {
    let analysis = &config.analysis;
    let crop_width = args.crop_width.unwrap_or(analysis.crop_width);
    let crop_height = args.crop_height.unwrap_or(analysis.crop_height);
    let flow_config = BlockMatchConfig {
        block_size: args.block_size.unwrap_or(analysis.block_size),
        search_range: args.search_range.unwrap_or(analysis.search_range),
        ..Default::default()
    };

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl-C handler")?;
    }

    super::for_each_input(&args.inputs, |input| {
        if stop.load(Ordering::SeqCst) {
            anyhow::bail!("not started: interrupted");
        }
        extract_one(
            input,
            crop_width,
            crop_height,
            &flow_config,
            &stop,
            args.preview.then(|| analysis.preview_window),
        )
    })
}

fn extract_one(
    input: &Path,
    crop_width: usize,
    crop_height: usize,
    flow_config: &BlockMatchConfig,
    stop: &AtomicBool,
    preview_window: Option<usize>,
) -> anyhow::Result<()> {
    let store = MetricsStore::for_video(input);
    let mut engine = BlockMatchFlow::new(flow_config.clone());
    let mut window = preview_window.map(RollingWindow::new);

    let mut on_sample = |sample: &FlowSample| {
        if let Some(window) = window.as_mut() {
            let means = window.push(*sample);
            tracing::info!(
                frame = sample.frame_index,
                zoom = means.zoom_factor,
                angle = means.angle_degrees,
                magnitude = means.magnitude,
                "preview"
            );
        }
    };

    let outcome = run_extraction(
        &store,
        || FfmpegFrameSource::open(input, crop_width, crop_height),
        &mut engine,
        stop,
        &mut on_sample,
    )?;

    match outcome {
        ExtractionOutcome::Skipped { path } => {
            println!("{}: already extracted ({})", input.display(), path.display());
        }
        ExtractionOutcome::Completed { path, samples } => {
            println!("{}: {samples} samples -> {}", input.display(), path.display());
        }
        ExtractionOutcome::Interrupted { part_path, samples } => {
            anyhow::bail!(
                "interrupted after {samples} samples; partial output left at {}",
                part_path.display()
            );
        }
    }
    Ok(())
}
