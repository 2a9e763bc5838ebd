use super::state::AppState;
use crate::error::{ErrorKind, TranscriptionError};
use crate::service::TranscriptionRequest;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeRequest {
    /// Base64-encoded WAV file
    pub audio: String,

    /// Recognition language (default: en-US)
    pub language: Option<String>,

    /// Per-request session deadline override
    pub session_deadline_ms: Option<u64>,

    /// Per-request liveness poll interval override
    pub liveness_poll_interval_ms: Option<u64>,
}

impl TranscribeRequest {
    fn into_request(self) -> Result<TranscriptionRequest, TranscriptionError> {
        let audio = base64::engine::general_purpose::STANDARD
            .decode(self.audio.trim())
            .map_err(|e| {
                TranscriptionError::InvalidInput(format!("Audio is not valid base64: {}", e))
            })?;

        let mut request = TranscriptionRequest::new(audio);
        request.language = self.language;
        request.session_deadline = self.session_deadline_ms.map(Duration::from_millis);
        request.liveness_poll_interval = self.liveness_poll_interval_ms.map(Duration::from_millis);
        Ok(request)
    }
}

/// Query parameters accompanying a raw audio body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAudioParams {
    pub language: Option<String>,
    pub session_deadline_ms: Option<u64>,
    pub liveness_poll_interval_ms: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub transcript: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_kind: ErrorKind,
    pub detail: String,
}

impl IntoResponse for TranscriptionError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::EngineUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::EngineFailure => StatusCode::BAD_GATEWAY,
        };

        (
            status,
            Json(ErrorResponse {
                error_kind: self.kind(),
                detail: self.detail().to_string(),
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /transcriptions/transcribe
/// Transcribe an audio file
///
/// Accepts a multipart form (`file` part plus optional `language`), a JSON body with
/// base64 audio, or the raw WAV bytes with options in the query string.
pub async fn transcribe_audio(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<TranscribeResponse>, TranscriptionError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let parsed = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| invalid_body(e.body_text()))?;
        read_form(multipart).await
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<TranscribeRequest>::from_request(request, &state)
            .await
            .map_err(|e| invalid_body(e.body_text()))?;
        body.into_request()
    } else {
        read_raw(request, &state).await
    };

    let request = parsed.map_err(|e| {
        warn!("Rejecting transcription request: {}", e);
        e
    })?;

    info!(
        "Transcribing {} bytes of audio (language={:?})",
        request.audio.len(),
        request.language
    );

    match state.transcription.transcribe(request).await {
        Ok(transcript) => Ok(Json(TranscribeResponse { transcript })),
        Err(e) => {
            error!("Error transcribing audio: {}", e);
            Err(e)
        }
    }
}

fn invalid_body(detail: impl std::fmt::Display) -> TranscriptionError {
    TranscriptionError::InvalidInput(format!("Malformed request body: {}", detail))
}

fn parse_millis(name: &str, value: &str) -> Result<Duration, TranscriptionError> {
    value
        .trim()
        .parse()
        .map(Duration::from_millis)
        .map_err(|_| TranscriptionError::InvalidInput(format!("{} must be a whole number", name)))
}

/// Multipart upload as sent by the web client
async fn read_form(mut multipart: Multipart) -> Result<TranscriptionRequest, TranscriptionError> {
    let mut audio = None;
    let mut request = TranscriptionRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_body)? {
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some("file") => audio = Some(field.bytes().await.map_err(invalid_body)?.to_vec()),
            Some("language") => {
                request.language = Some(field.text().await.map_err(invalid_body)?);
            }
            Some("sessionDeadlineMs") => {
                let value = field.text().await.map_err(invalid_body)?;
                request.session_deadline = Some(parse_millis("sessionDeadlineMs", &value)?);
            }
            Some("livenessPollIntervalMs") => {
                let value = field.text().await.map_err(invalid_body)?;
                request.liveness_poll_interval =
                    Some(parse_millis("livenessPollIntervalMs", &value)?);
            }
            _ => {}
        }
    }

    request.audio = audio.ok_or_else(|| {
        TranscriptionError::InvalidInput("No audio file found in the request".to_string())
    })?;

    Ok(request)
}

/// WAV bytes as the request body
async fn read_raw(
    request: Request,
    state: &AppState,
) -> Result<TranscriptionRequest, TranscriptionError> {
    let Query(params) = Query::<RawAudioParams>::try_from_uri(request.uri())
        .map_err(|e| TranscriptionError::InvalidInput(e.body_text()))?;

    let audio = Bytes::from_request(request, state)
        .await
        .map_err(|e| invalid_body(e.body_text()))?;

    let mut request = TranscriptionRequest::new(audio.to_vec());
    request.language = params.language;
    request.session_deadline = params.session_deadline_ms.map(Duration::from_millis);
    request.liveness_poll_interval = params.liveness_poll_interval_ms.map(Duration::from_millis);
    Ok(request)
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
