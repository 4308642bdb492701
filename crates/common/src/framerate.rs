//! Frame-rate handling and frame/time conversion.
//!
//! Containers report frame rates as rationals (`30000/1001`). Segmentation
//! works in seconds, so every frame index is converted through a single
//! [`FrameRate`] resolved once per input.

use std::fmt;
use std::str::FromStr;

/// A rational frame rate, e.g. `30000/1001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    /// Create a frame rate. Returns `None` when either term is zero.
    pub fn new(numerator: u32, denominator: u32) -> Option<Self> {
        if numerator == 0 || denominator == 0 {
            return None;
        }
        Some(Self {
            numerator,
            denominator,
        })
    }

    /// Build from a floating-point rate (used for `--fps` overrides).
    ///
    /// Rates are stored with millihertz precision.
    pub fn from_f64(fps: f64) -> Option<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return None;
        }
        let numerator = (fps * 1000.0).round();
        if numerator < 1.0 || numerator > u32::MAX as f64 {
            return None;
        }
        Self::new(numerator as u32, 1000)
    }

    /// Frames per second as a float.
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Convert a frame index to seconds.
    pub fn frame_to_secs(&self, frame: u64) -> f64 {
        frame as f64 / self.as_f64()
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Error produced when a rational frame-rate string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid frame rate `{0}`")]
pub struct ParseFrameRateError(pub String);

impl FromStr for FrameRate {
    type Err = ParseFrameRateError;

    /// Accepts `num/den` (ffprobe `r_frame_rate`) or a bare integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseFrameRateError(trimmed.to_string());

        let (num, den) = match trimmed.split_once('/') {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (trimmed, "1"),
        };

        let numerator = num.parse::<u32>().map_err(|_| err())?;
        let denominator = den.parse::<u32>().map_err(|_| err())?;
        Self::new(numerator, denominator).ok_or_else(err)
    }
}
