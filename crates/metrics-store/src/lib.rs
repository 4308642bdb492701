//! camflow Metrics Store
//!
//! Durable per-frame motion metrics, one table per source video, written once
//! by extraction and read back wholesale by segmentation.
//!
//! The table for `clip.mp4` lives next to it as `clip.mp4.flow.csv`.

pub mod writer;

use std::path::{Path, PathBuf};

use camflow_common::error::{CamflowError, CamflowResult};
use camflow_motion_model::sample::{parse_metrics, FlowSample};

pub use writer::MetricsWriter;

/// Suffix appended to a video path to name its metrics table.
pub const METRICS_SUFFIX: &str = ".flow.csv";

/// Handle to the metrics table of one source video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsStore {
    input: PathBuf,
    path: PathBuf,
}

impl MetricsStore {
    /// The store for `video`, named deterministically from its path.
    pub fn for_video(video: impl AsRef<Path>) -> Self {
        let input = video.as_ref().to_path_buf();
        let mut name = input.as_os_str().to_owned();
        name.push(METRICS_SUFFIX);
        Self {
            path: PathBuf::from(name),
            input,
        }
    }

    /// Source video this store belongs to.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Path of the committed metrics table.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a committed table exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Start writing a fresh table. Nothing becomes visible at [`Self::path`]
    /// until the writer is committed.
    pub fn create_writer(&self) -> CamflowResult<MetricsWriter> {
        MetricsWriter::create(self.path.clone())
    }

    /// Read every sample in written order.
    ///
    /// Returns [`CamflowError::MetricsMissing`] when no table has been
    /// committed and [`CamflowError::MalformedRecord`] on any schema violation.
    pub fn read_all(&self) -> CamflowResult<Vec<FlowSample>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CamflowError::metrics_missing(
                    self.input.display().to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        let samples = parse_metrics(&content, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            samples = samples.len(),
            "Metrics loaded"
        );
        Ok(samples)
    }
}
