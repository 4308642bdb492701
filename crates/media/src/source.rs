//! Frame sources.
//!
//! A [`FrameSource`] yields grayscale frames of the analysis region in decode
//! order. [`FfmpegFrameSource`] decodes a video file by piping raw `gray`
//! frames out of an `ffmpeg` child process, cropped to the region in ffmpeg.

use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use camflow_common::error::{CamflowError, CamflowResult};
use camflow_motion_model::frame::GrayFrame;
use camflow_motion_model::geometry::FrameGeometry;

use crate::probe::probe_dimensions;

/// A stream of grayscale frames with a fixed geometry.
pub trait FrameSource {
    /// Geometry of every frame this source yields.
    fn geometry(&self) -> FrameGeometry;

    /// The next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> CamflowResult<Option<GrayFrame>>;
}

/// Decodes a video file through `ffmpeg`, cropping the centered analysis
/// region.
pub struct FfmpegFrameSource {
    input: String,
    geometry: FrameGeometry,
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr_task: Option<JoinHandle<String>>,
    frames_read: u64,
    finished: bool,
}

impl FfmpegFrameSource {
    /// Probe `path` and start decoding a `crop_width × crop_height` region
    /// from the center of every frame. The crop is clamped to the frame size.
    pub fn open(path: &Path, crop_width: usize, crop_height: usize) -> CamflowResult<Self> {
        let input = path.display().to_string();
        if crop_width == 0 || crop_height == 0 {
            return Err(CamflowError::config("crop size must be positive"));
        }

        let (source_width, source_height) = probe_dimensions(path)?;
        let geometry =
            FrameGeometry::centered_crop(source_width, source_height, crop_width, crop_height);

        let crop = format!(
            "crop={w}:{h}:(iw-{w})/2:(ih-{h})/2",
            w = geometry.width,
            h = geometry.height
        );
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-nostdin", "-v", "error", "-i"])
            .arg(path)
            .args(["-vf", &crop, "-f", "rawvideo", "-pix_fmt", "gray", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(
            input = %input,
            source_width,
            source_height,
            width = geometry.width,
            height = geometry.height,
            "Starting ffmpeg frame source"
        );

        let mut child = cmd.spawn().map_err(|e| {
            CamflowError::input_unavailable(&input, format!("failed to start ffmpeg: {e}"))
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            CamflowError::input_unavailable(&input, "failed to capture ffmpeg stdout")
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            CamflowError::input_unavailable(&input, "failed to capture ffmpeg stderr")
        })?;

        // Drain stderr concurrently so ffmpeg never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        Ok(Self {
            input,
            geometry,
            child,
            stdout: BufReader::new(stdout),
            stderr_task: Some(stderr_task),
            frames_read: 0,
            finished: false,
        })
    }

    /// Reap the child at end of stream. A failing ffmpeg is only an error
    /// when it produced no frames at all.
    fn finish(&mut self) -> CamflowResult<()> {
        self.finished = true;
        let status = self.child.wait()?;
        let stderr = self
            .stderr_task
            .take()
            .and_then(|task| task.join().ok())
            .unwrap_or_default();

        if status.success() {
            return Ok(());
        }
        if self.frames_read == 0 {
            return Err(CamflowError::input_unavailable(
                &self.input,
                format!("ffmpeg failed ({status}): {}", stderr.trim()),
            ));
        }

        tracing::warn!(
            input = %self.input,
            frames = self.frames_read,
            %status,
            stderr = %stderr.trim(),
            "ffmpeg exited with an error after decoding; treating as end of stream"
        );
        Ok(())
    }
}

impl FrameSource for FfmpegFrameSource {
    fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    fn next_frame(&mut self) -> CamflowResult<Option<GrayFrame>> {
        if self.finished {
            return Ok(None);
        }

        let mut pixels = vec![0u8; self.geometry.pixel_count()];
        match self.stdout.read_exact(&mut pixels) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.finish()?;
                return Ok(None);
            }
            Err(e) => {
                return Err(CamflowError::input_unavailable(
                    &self.input,
                    format!("failed reading decoded frame: {e}"),
                ));
            }
        }

        self.frames_read += 1;
        GrayFrame::new(self.geometry, pixels)
            .map(Some)
            .ok_or_else(|| CamflowError::flow("decoded frame size mismatch"))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
