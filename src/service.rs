use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::TranscriptionConfig;
use crate::engine::EngineFactory;
use crate::error::{TranscriptionError, TranscriptionResult};
use crate::session::{SessionConfig, SessionController};

/// A request to transcribe one audio file
#[derive(Debug, Clone, Default)]
pub struct TranscriptionRequest {
    /// WAV file contents
    pub audio: Vec<u8>,

    /// Recognition language; blank or missing uses the configured default
    pub language: Option<String>,

    /// Overrides the configured session deadline
    pub session_deadline: Option<Duration>,

    /// Overrides the configured liveness poll interval
    pub liveness_poll_interval: Option<Duration>,
}

impl TranscriptionRequest {
    pub fn new(audio: Vec<u8>) -> Self {
        Self {
            audio,
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_session_deadline(mut self, deadline: Duration) -> Self {
        self.session_deadline = Some(deadline);
        self
    }

    pub fn with_liveness_poll_interval(mut self, interval: Duration) -> Self {
        self.liveness_poll_interval = Some(interval);
        self
    }
}

/// Entry point for audio transcription
///
/// Every call runs a fresh engine and session; the service keeps no session state.
pub struct TranscriptionService {
    engines: Arc<dyn EngineFactory>,
    settings: TranscriptionConfig,
}

impl TranscriptionService {
    pub fn new(engines: Arc<dyn EngineFactory>, settings: TranscriptionConfig) -> Self {
        Self { engines, settings }
    }

    /// Transcribe `audio` with the configured timing
    pub async fn transcribe_audio(
        &self,
        audio: Vec<u8>,
        language: &str,
    ) -> TranscriptionResult<String> {
        self.transcribe(TranscriptionRequest::new(audio).with_language(language))
            .await
    }

    /// Transcribe one request
    ///
    /// Returns the final transcript, which may be partial or empty if the session ran
    /// out of time.
    pub async fn transcribe(&self, request: TranscriptionRequest) -> TranscriptionResult<String> {
        let config = self.session_config(&request)?;

        let engine = self.engines.create(&config.session_id).map_err(|e| {
            error!("Failed to create recognition engine: {:#}", e);
            TranscriptionError::EngineUnavailable(format!("{:#}", e))
        })?;

        let report = SessionController::new(engine, config)
            .run(&request.audio)
            .await;

        info!(
            "Transcription {} finished by {:?}",
            report.stats.session_id, report.stats.trigger
        );

        report.outcome.into_result()
    }

    /// Validate the request and merge it with the configured defaults
    fn session_config(&self, request: &TranscriptionRequest) -> TranscriptionResult<SessionConfig> {
        if request.audio.is_empty() {
            return Err(TranscriptionError::InvalidInput(
                "No audio data in request".to_string(),
            ));
        }

        let deadline = request
            .session_deadline
            .unwrap_or(Duration::from_millis(self.settings.session_deadline_ms));
        let liveness_poll_interval = request
            .liveness_poll_interval
            .unwrap_or(Duration::from_millis(self.settings.liveness_poll_interval_ms));

        if deadline.is_zero() {
            return Err(TranscriptionError::InvalidInput(
                "Session deadline must be greater than zero".to_string(),
            ));
        }
        if liveness_poll_interval.is_zero() {
            return Err(TranscriptionError::InvalidInput(
                "Liveness poll interval must be greater than zero".to_string(),
            ));
        }

        let language = match request.language.as_deref().map(str::trim) {
            Some(language) if !language.is_empty() => language.to_string(),
            _ => self.settings.default_language.clone(),
        };

        Ok(SessionConfig {
            language,
            deadline,
            liveness_poll_interval,
            stop_grace: Duration::from_millis(self.settings.stop_grace_ms),
            ..SessionConfig::default()
        })
    }
}
