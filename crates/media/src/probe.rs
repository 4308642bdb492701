//! ffprobe lookups and tool discovery.

use std::path::Path;
use std::process::Command;

use camflow_common::error::{CamflowError, CamflowResult};
use camflow_common::framerate::FrameRate;

/// Whether `binary` resolves on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Nominal frame rate of the first video stream of `path`.
pub fn probe_frame_rate(path: &Path) -> CamflowResult<FrameRate> {
    let raw = run_ffprobe(path, "stream=r_frame_rate", "default=noprint_wrappers=1:nokey=1")?;
    parse_frame_rate(&raw, &path.display().to_string())
}

/// Pixel dimensions `(width, height)` of the first video stream of `path`.
pub fn probe_dimensions(path: &Path) -> CamflowResult<(usize, usize)> {
    let raw = run_ffprobe(path, "stream=width,height", "csv=p=0:s=x")?;
    parse_dimensions(&raw, &path.display().to_string())
}

fn run_ffprobe(path: &Path, entries: &str, format: &str) -> CamflowResult<String> {
    let input = path.display().to_string();
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            entries,
            "-of",
            format,
        ])
        .arg(path)
        .output()
        .map_err(|e| {
            CamflowError::input_unavailable(&input, format!("failed to run ffprobe: {e}"))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CamflowError::input_unavailable(
            input,
            format!("ffprobe failed ({}): {}", output.status, stderr.trim()),
        ));
    }

    String::from_utf8(output.stdout)
        .map_err(|_| CamflowError::input_unavailable(input, "ffprobe printed non-UTF-8 output"))
}

/// Parse ffprobe's `r_frame_rate` output (`30000/1001`).
pub fn parse_frame_rate(raw: &str, input: &str) -> CamflowResult<FrameRate> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| CamflowError::input_unavailable(input, "ffprobe reported no video stream"))?;

    line.parse::<FrameRate>().map_err(|e| {
        CamflowError::input_unavailable(input, format!("unusable frame rate: {e}"))
    })
}

/// Parse ffprobe's `WIDTHxHEIGHT` output.
pub fn parse_dimensions(raw: &str, input: &str) -> CamflowResult<(usize, usize)> {
    let bad = || {
        CamflowError::input_unavailable(input, format!("unusable dimensions {:?}", raw.trim()))
    };

    let line = raw.lines().next().ok_or_else(bad)?.trim();
    let (w, h) = line.split_once('x').ok_or_else(bad)?;
    let width = w.trim().parse::<usize>().map_err(|_| bad())?;
    let height = h.trim().parse::<usize>().map_err(|_| bad())?;
    if width == 0 || height == 0 {
        return Err(bad());
    }
    Ok((width, height))
}
