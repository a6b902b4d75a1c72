use std::path::PathBuf;

use thiserror::Error;

/// Failure reasons for the alignment and corner detection entry points.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to load image")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Could not detect document corners")]
    CornersNotFound,

    #[error("failed to save image {path:?}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{0}")]
    Internal(String),
}

/// Coarse category of a [`ProcessError`], for callers that map failures to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The input could not be read or decoded.
    Input,
    /// The input was valid but no qualifying geometry was found.
    Detection,
    /// Anything else that went wrong while processing.
    Internal,
}

impl ProcessError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProcessError::ImageLoad { .. } => FailureKind::Input,
            ProcessError::CornersNotFound => FailureKind::Detection,
            ProcessError::ImageSave { .. } | ProcessError::Internal(_) => FailureKind::Internal,
        }
    }
}

/// Outcome of a public operation: `Ok` carries the payload, `Err` the failure reason.
pub type OperationResult<T> = std::result::Result<T, ProcessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_reported_reasons() {
        let err = ProcessError::ImageLoad {
            path: PathBuf::from("missing.png"),
            source: image::ImageError::IoError(std::io::Error::from(
                std::io::ErrorKind::NotFound,
            )),
        };
        assert_eq!(err.to_string(), "Failed to load image");
        assert_eq!(err.kind(), FailureKind::Input);

        let err = ProcessError::CornersNotFound;
        assert_eq!(err.to_string(), "Could not detect document corners");
        assert_eq!(err.kind(), FailureKind::Detection);

        assert_eq!(
            ProcessError::Internal("boom".into()).kind(),
            FailureKind::Internal
        );
    }
}
