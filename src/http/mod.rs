//! HTTP API for the transcription service
//!
//! - POST /transcriptions/transcribe - Transcribe a WAV file (multipart form, JSON or raw body)
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{ErrorResponse, RawAudioParams, TranscribeRequest, TranscribeResponse};
pub use routes::create_router;
pub use state::AppState;
