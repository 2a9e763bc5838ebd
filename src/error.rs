use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure categories reported to callers of the transcription service
///
/// A session that runs out of time is not a failure: it returns whatever was
/// transcribed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Empty or malformed request; retrying the same request will not help
    InvalidInput,
    /// The recognition session could not be started
    EngineUnavailable,
    /// The engine aborted a running session
    EngineFailure,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Recognition engine failed: {0}")]
    EngineFailure(String),
}

impl TranscriptionError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match kind {
            ErrorKind::InvalidInput => TranscriptionError::InvalidInput(detail),
            ErrorKind::EngineUnavailable => TranscriptionError::EngineUnavailable(detail),
            ErrorKind::EngineFailure => TranscriptionError::EngineFailure(detail),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscriptionError::InvalidInput(_) => ErrorKind::InvalidInput,
            TranscriptionError::EngineUnavailable(_) => ErrorKind::EngineUnavailable,
            TranscriptionError::EngineFailure(_) => ErrorKind::EngineFailure,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            TranscriptionError::InvalidInput(detail)
            | TranscriptionError::EngineUnavailable(detail)
            | TranscriptionError::EngineFailure(detail) => detail,
        }
    }
}

pub type TranscriptionResult<T> = Result<T, TranscriptionError>;
