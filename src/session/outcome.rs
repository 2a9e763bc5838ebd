use crate::error::{ErrorKind, TranscriptionError};

/// The single result of a transcription session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Final transcript, possibly partial (deadline) or empty
    Transcript(String),
    Failed { kind: ErrorKind, detail: String },
}

impl SessionOutcome {
    pub fn failed(kind: ErrorKind, detail: impl Into<String>) -> Self {
        SessionOutcome::Failed {
            kind,
            detail: detail.into(),
        }
    }

    pub fn into_result(self) -> Result<String, TranscriptionError> {
        match self {
            SessionOutcome::Transcript(text) => Ok(text),
            SessionOutcome::Failed { kind, detail } => Err(TranscriptionError::new(kind, detail)),
        }
    }
}
