//! Per-frame motion samples and the metrics text format.
//!
//! The metrics file is a comma-separated table with the header
//! `frame,mag,ang,zoom` and one row per [`FlowSample`]. Floats are written in
//! Rust's shortest round-trip representation, so reading a file back yields
//! bit-identical values and threshold comparisons stay deterministic.

use std::path::Path;

use camflow_common::error::{CamflowError, CamflowResult};

/// Column names of the metrics table, in write order.
pub const METRICS_COLUMNS: [&str; 4] = ["frame", "mag", "ang", "zoom"];

/// Motion metrics for one frame transition.
///
/// `frame_index` names the later frame of the pair, so the first sample of a
/// stream has index 2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSample {
    pub frame_index: u64,

    /// Median displacement magnitude (pixels).
    pub magnitude: f64,

    /// Median displacement angle in degrees, `[0, 360)`.
    pub angle_degrees: f64,

    /// Fraction of pixels that moved away from (or stayed at) their distance
    /// from center, `[0, 1]`.
    pub zoom_factor: f64,
}

impl FlowSample {
    pub fn new(frame_index: u64, magnitude: f64, angle_degrees: f64, zoom_factor: f64) -> Self {
        Self {
            frame_index,
            magnitude,
            angle_degrees,
            zoom_factor,
        }
    }
}

/// Destination for samples produced during extraction.
pub trait SampleSink {
    /// Append one sample. Samples arrive in increasing frame order.
    fn append(&mut self, sample: &FlowSample) -> CamflowResult<()>;
}

impl SampleSink for Vec<FlowSample> {
    fn append(&mut self, sample: &FlowSample) -> CamflowResult<()> {
        self.push(*sample);
        Ok(())
    }
}

/// The header line of the metrics table (no trailing newline).
pub fn metrics_header() -> String {
    METRICS_COLUMNS.join(",")
}

/// Format one sample as a metrics row (no trailing newline).
pub fn format_sample_row(sample: &FlowSample) -> String {
    format!(
        "{},{},{},{}",
        sample.frame_index, sample.magnitude, sample.angle_degrees, sample.zoom_factor
    )
}

/// Parse a complete metrics table.
///
/// `path` is only used to label errors. Blank lines are ignored. Columns are
/// matched by header name; a missing column, wrong field count, unparsable or
/// non-finite number, a zero frame index, or a frame index that does not
/// increase is reported as [`CamflowError::MalformedRecord`].
pub fn parse_metrics(content: &str, path: &Path) -> CamflowResult<Vec<FlowSample>> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) = lines
        .next()
        .ok_or_else(|| CamflowError::malformed(path, 1, "missing header"))?;

    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let mut index = [0usize; 4];
    for (slot, name) in index.iter_mut().zip(METRICS_COLUMNS) {
        *slot = columns.iter().position(|c| *c == name).ok_or_else(|| {
            CamflowError::malformed(path, header_line, format!("missing column `{name}`"))
        })?;
    }

    let mut samples = Vec::new();
    let mut last_frame: Option<u64> = None;

    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != columns.len() {
            return Err(CamflowError::malformed(
                path,
                line_no,
                format!("expected {} fields, found {}", columns.len(), fields.len()),
            ));
        }

        let frame_index = fields[index[0]].parse::<u64>().map_err(|e| {
            CamflowError::malformed(
                path,
                line_no,
                format!("bad frame `{}`: {e}", fields[index[0]]),
            )
        })?;
        if frame_index == 0 {
            return Err(CamflowError::malformed(
                path,
                line_no,
                "frame indices start at 1",
            ));
        }
        let magnitude = parse_finite(fields[index[1]], "mag", path, line_no)?;
        let angle_degrees = parse_finite(fields[index[2]], "ang", path, line_no)?;
        let zoom_factor = parse_finite(fields[index[3]], "zoom", path, line_no)?;

        if let Some(prev) = last_frame {
            if frame_index <= prev {
                return Err(CamflowError::malformed(
                    path,
                    line_no,
                    format!("frame {frame_index} does not follow frame {prev}"),
                ));
            }
        }
        last_frame = Some(frame_index);

        samples.push(FlowSample {
            frame_index,
            magnitude,
            angle_degrees,
            zoom_factor,
        });
    }

    Ok(samples)
}

fn parse_finite(raw: &str, column: &str, path: &Path, line: usize) -> CamflowResult<f64> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(CamflowError::malformed(
            path,
            line,
            format!("non-finite {column} `{raw}`"),
        )),
        Err(e) => Err(CamflowError::malformed(
            path,
            line,
            format!("bad {column} `{raw}`: {e}"),
        )),
    }
}
