use std::path::PathBuf;

use thiserror::Error;

/// Failure modes for a single file visited by the distribution scanner.
///
/// `UnhandledFileType` is not really an error — callers should treat it as
/// "skip silently" rather than logging it at the same level as
/// [`ScanError::InvalidFile`].
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("unhandled file type: {0}")]
    UnhandledFileType(PathBuf),

    #[error("invalid archive {path}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ScanError::InvalidFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the "not an archive we care about" case that must never be
    /// logged as a failure (spec: UnhandledFileType is never surfaced).
    pub fn is_unhandled(&self) -> bool {
        matches!(self, ScanError::UnhandledFileType(_))
    }
}
