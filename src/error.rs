//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error from a collaborator (detector or frame source).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Rejected session configuration. A session never starts with one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{gate} line has coincident endpoints at ({x}, {y})")]
    DegenerateLine { gate: &'static str, x: f32, y: f32 },

    #[error("{gate} line has non-finite coordinates")]
    NonFiniteLine { gate: &'static str },

    #[error("confidence threshold {0} is outside [0, 1]")]
    ConfidenceThreshold(f32),

    #[error("{name} must be finite and non-negative, got {value}")]
    Duration { name: &'static str, value: f64 },

    #[error("recognized class set is empty")]
    NoRecognizedClasses,

    #[error("recognized class set must not contain `unknown`")]
    UnknownClassRecognized,

    #[error("frame stride must be at least 1")]
    ZeroFrameStride,

    #[error("tracker min_hits must be at least 1")]
    ZeroMinHits,

    #[error("tracker frame_rate must be positive, got {0}")]
    FrameRate(f32),

    #[error("record_ttl_secs {ttl} is shorter than the tracker's lost-track window of {window} s")]
    RecordTtlTooShort { ttl: f64, window: f64 },
}

/// Failure of a processing session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session configuration: {0}")]
    Config(#[from] ConfigError),

    /// The input could not be opened or read.
    #[error("frame source failed: {0}")]
    Source(#[source] BoxError),

    #[error("detector failed: {0}")]
    Detector(#[source] BoxError),
}

impl SessionError {
    pub fn source_error(err: impl Into<BoxError>) -> Self {
        Self::Source(err.into())
    }

    pub fn detector_error(err: impl Into<BoxError>) -> Self {
        Self::Detector(err.into())
    }
}
