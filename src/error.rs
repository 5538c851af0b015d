use std::path::PathBuf;
use thiserror::Error;

/// Classified failures that callers need to tell apart
#[derive(Debug, Error)]
pub enum SyncError {
    /// Source directory of a copy is absent; callers treat this as a skip
    #[error("source directory does not exist: {}", .0.display())]
    MissingSource(PathBuf),

    /// A file or directory required by the summary is absent
    #[error("required input does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("no version directory (vX.Y.Z) found under {}", .0.display())]
    NoVersionDirectory(PathBuf),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to publish text to {sink}: {reason}")]
    Publish { sink: String, reason: String },
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error only means "nothing to do here"
    pub fn is_missing_source(&self) -> bool {
        matches!(self, SyncError::MissingSource(_))
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
