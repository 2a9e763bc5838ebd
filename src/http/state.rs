use crate::service::TranscriptionService;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub transcription: Arc<TranscriptionService>,
}

impl AppState {
    pub fn new(transcription: TranscriptionService) -> Self {
        Self {
            transcription: Arc::new(transcription),
        }
    }
}
