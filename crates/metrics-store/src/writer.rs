//! Append-only metrics writer.
//!
//! Rows go to a `.part` sibling of the final path. Only [`MetricsWriter::commit`]
//! renames it into place, so the metrics file either holds a complete series or
//! does not exist.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use camflow_common::error::{CamflowError, CamflowResult};
use camflow_motion_model::sample::{format_sample_row, metrics_header, FlowSample, SampleSink};

/// Writes flow samples to a metrics table in append-only mode.
pub struct MetricsWriter {
    writer: BufWriter<File>,
    final_path: PathBuf,
    part_path: PathBuf,
    samples_written: u64,
    last_frame: Option<u64>,
}

impl MetricsWriter {
    /// Create a writer for `final_path`, writing the header as the first line
    /// of a fresh `.part` file.
    pub fn create(final_path: PathBuf) -> CamflowResult<Self> {
        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let part_path = part_path_for(&final_path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&part_path)?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", metrics_header())?;

        Ok(Self {
            writer,
            final_path,
            part_path,
            samples_written: 0,
            last_frame: None,
        })
    }

    /// Write a single sample as one row.
    pub fn write_sample(&mut self, sample: &FlowSample) -> CamflowResult<()> {
        if sample.frame_index == 0 {
            return Err(CamflowError::malformed(
                &self.part_path,
                self.samples_written as usize + 2,
                "frame indices start at 1",
            ));
        }
        if let Some(prev) = self.last_frame {
            if sample.frame_index <= prev {
                return Err(CamflowError::malformed(
                    &self.part_path,
                    self.samples_written as usize + 2,
                    format!(
                        "frame {} appended after frame {prev}",
                        sample.frame_index
                    ),
                ));
            }
        }

        writeln!(self.writer, "{}", format_sample_row(sample))?;
        self.samples_written += 1;
        self.last_frame = Some(sample.frame_index);

        // Flush every 500 rows so an interrupted run leaves whole lines behind
        if self.samples_written % 500 == 0 {
            self.flush()?;
        }

        Ok(())
    }

    /// Flush buffered writes to disk.
    pub fn flush(&mut self) -> CamflowResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush, sync, and move the completed table to its final path.
    pub fn commit(mut self) -> CamflowResult<PathBuf> {
        self.flush()?;
        self.writer.get_ref().sync_all()?;
        std::fs::rename(&self.part_path, &self.final_path)?;
        tracing::debug!(
            path = %self.final_path.display(),
            samples = self.samples_written,
            "Metrics committed"
        );
        Ok(self.final_path.clone())
    }

    /// Flush and leave the partial table in place without committing it.
    pub fn abandon(mut self) -> CamflowResult<PathBuf> {
        self.flush()?;
        tracing::warn!(
            path = %self.part_path.display(),
            samples = self.samples_written,
            "Extraction stopped early; partial metrics left uncommitted"
        );
        Ok(self.part_path.clone())
    }

    /// Number of samples written.
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }
}

impl SampleSink for MetricsWriter {
    fn append(&mut self, sample: &FlowSample) -> CamflowResult<()> {
        self.write_sample(sample)
    }
}

impl Drop for MetricsWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// In-progress sibling of a metrics path: `<name>.part`.
pub fn part_path_for(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
