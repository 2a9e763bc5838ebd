use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Largest accepted upload; a full session of 48kHz stereo WAV fits comfortably
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Transcription
        .route(
            "/transcriptions/transcribe",
            post(handlers::transcribe_audio).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
