//! Summarize the stored metrics of a video.

use std::path::PathBuf;

use camflow_metrics_store::MetricsStore;
use camflow_processing_core::metrics::median;

pub fn run(video: PathBuf) -> anyhow::Result<()> {
    let store = MetricsStore::for_video(&video);
    let samples = store.read_all()?;

    println!("Video: {}", video.display());
    println!("  Metrics: {}", store.path().display());
    println!("  Samples: {}", samples.len());

    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        println!("  No frame transitions recorded.");
        return Ok(());
    };
    println!("  Frames: {}..={}", first.frame_index, last.frame_index);

    let mut mags: Vec<f64> = samples.iter().map(|s| s.magnitude).collect();
    let mut angs: Vec<f64> = samples.iter().map(|s| s.angle_degrees).collect();
    let mut zooms: Vec<f64> = samples.iter().map(|s| s.zoom_factor).collect();
    let max_mag = mags.iter().copied().fold(0.0, f64::max);

    println!();
    println!("Medians:");
    println!("  Magnitude: {:.3} (max {:.3})", median(&mut mags), max_mag);
    println!("  Angle: {:.1}°", median(&mut angs));
    println!("  Zoom factor: {:.3}", median(&mut zooms));

    Ok(())
}
