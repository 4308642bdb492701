//! Error types shared across camflow crates.

use std::path::PathBuf;

/// Top-level error type for camflow operations.
#[derive(Debug, thiserror::Error)]
pub enum CamflowError {
    /// The source frame stream could not be opened or read.
    #[error("Input unavailable: {input}: {message}")]
    InputUnavailable { input: String, message: String },

    /// Segmentation was requested before extraction produced a metrics file.
    #[error("No motion metrics for {input}; run `camflow extract` on it first")]
    MetricsMissing { input: String },

    /// A stored metrics record violates the fixed schema.
    #[error("Malformed record in {path} at line {line}: {message}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A displacement field or frame disagrees with the run geometry.
    #[error(
        "Geometry mismatch: expected {}x{}, got {}x{}",
        expected.0,
        expected.1,
        actual.0,
        actual.1
    )]
    GeometryMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Flow engine error: {message}")]
    Flow { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CamflowError.
pub type CamflowResult<T> = Result<T, CamflowError>;

impl CamflowError {
    pub fn input_unavailable(input: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InputUnavailable {
            input: input.into(),
            message: msg.into(),
        }
    }

    pub fn metrics_missing(input: impl Into<String>) -> Self {
        Self::MetricsMissing {
            input: input.into(),
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, line: usize, msg: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            line,
            message: msg.into(),
        }
    }

    pub fn geometry_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::GeometryMismatch { expected, actual }
    }

    pub fn flow(msg: impl Into<String>) -> Self {
        Self::Flow {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
