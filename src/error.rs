use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("Unable to load image {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Unable to open video file {}", path.display())]
    Open { path: PathBuf },

    #[error("Unable to write video {}: {reason}", path.display())]
    Sink { path: PathBuf, reason: String },

    #[error("Marker detector failed: {0}")]
    Detector(String),

    /// Decode or pixel conversion failure on the video side
    #[error("Video processing failed: {0}")]
    Video(String),

    #[error("Presentation failed: {0}")]
    Present(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnnotateError {
    /// Errors that are reported to the user and end the run without a failure status.
    pub fn is_reportable(&self) -> bool {
        matches!(self, AnnotateError::Load { .. } | AnnotateError::Open { .. })
    }
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
