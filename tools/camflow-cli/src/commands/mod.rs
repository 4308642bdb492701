//! Subcommand implementations.

pub mod check;
pub mod extract;
pub mod info;
pub mod pan;
pub mod validate;
pub mod zoom;

use std::path::{Path, PathBuf};

use anyhow::Context;
use camflow_common::framerate::FrameRate;
use camflow_media::edl::{EdlPurpose, EditDecisionExporter};
use camflow_media::probe::probe_frame_rate;
use camflow_motion_model::interval::{EditDecisionList, Interval};
use clap::Args;

/// Run `f` over every input. A failing input is logged and the batch moves
/// on; the batch fails if any input did.
pub fn for_each_input(
    inputs: &[PathBuf],
    mut f: impl FnMut(&Path) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut failed = 0usize;
    for input in inputs {
        if let Err(e) = f(input) {
            failed += 1;
            tracing::error!(input = %input.display(), error = %format!("{e:#}"), "Input failed");
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} input(s) failed", inputs.len());
    }
    Ok(())
}

/// Options shared by the segmentation commands.
#[derive(Args, Debug)]
pub struct SegmentOutputArgs {
    /// Frame rate to convert frames to seconds (default: probed with ffprobe)
    #[arg(long)]
    pub fps: Option<f64>,

    /// Output purpose, part of the EDL file name: preview | final
    #[arg(long, default_value = "preview")]
    pub purpose: EdlPurpose,

    /// Directory for EDL files (default: next to each video)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Play the segments in mpv after writing the EDL
    #[arg(long)]
    pub play: bool,
}

impl SegmentOutputArgs {
    pub fn frame_rate(&self, video: &Path) -> anyhow::Result<FrameRate> {
        match self.fps {
            Some(fps) => FrameRate::from_f64(fps)
                .with_context(|| format!("--fps must be a positive number, got {fps}")),
            None => probe_frame_rate(video)
                .with_context(|| format!("Failed to read frame rate of {}", video.display())),
        }
    }

    /// Write the EDL for `video` and optionally play it.
    pub fn emit(&self, video: &Path, intervals: &[Interval]) -> anyhow::Result<()> {
        let edl = EditDecisionList::from_intervals(intervals);
        let exporter = EditDecisionExporter::new(self.out_dir.clone());
        let path = exporter.write_file(video, self.purpose, &edl)?;

        println!(
            "{}: {} segment(s), {:.2}s total -> {}",
            video.display(),
            edl.len(),
            edl.total_duration_secs(),
            path.display()
        );

        if self.play {
            if edl.is_empty() {
                tracing::warn!(input = %video.display(), "Nothing to play");
            } else {
                exporter.play_inline(&edl)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_continues_past_failures() {
        let inputs = vec![PathBuf::from("a"), PathBuf::from("bad"), PathBuf::from("c")];
        let mut visited = Vec::new();

        let result = for_each_input(&inputs, |input| {
            visited.push(input.to_path_buf());
            if input == Path::new("bad") {
                anyhow::bail!("broken");
            }
            Ok(())
        });

        assert_eq!(visited.len(), 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_fps_override_skips_probe() {
        let output = SegmentOutputArgs {
            fps: Some(29.97),
            purpose: EdlPurpose::Preview,
            out_dir: None,
            play: false,
        };
        let fps = output.frame_rate(Path::new("/does/not/exist.mp4")).unwrap();
        assert_eq!(fps, FrameRate::new(29970, 1000).unwrap());

        let bad = SegmentOutputArgs { fps: Some(0.0), ..output };
        assert!(bad.frame_rate(Path::new("x.mp4")).is_err());
    }
}
