// Integration tests for the transcription service facade

mod common;

use common::{wav_bytes, ScriptedEngine, ScriptedFactory};
use health_hub_transcription::config::TranscriptionConfig;
use health_hub_transcription::{
    ErrorKind, RecognitionEvent, TranscriptionError, TranscriptionRequest, TranscriptionService,
};
use std::sync::Arc;
use std::time::Duration;

fn service(factory: Arc<ScriptedFactory>) -> TranscriptionService {
    TranscriptionService::new(factory, TranscriptionConfig::default())
}

#[tokio::test]
async fn test_transcribe_returns_transcript() {
    let engine = ScriptedEngine::new()
        .final_text("Follow up in two weeks.")
        .emit(RecognitionEvent::EngineStopped);
    let factory = Arc::new(ScriptedFactory::new(engine));

    let transcript = service(factory.clone())
        .transcribe_audio(wav_bytes(), "en-US")
        .await
        .unwrap();

    assert_eq!(transcript, "Follow up in two weeks.");
    assert_eq!(factory.created(), 1);
}

#[tokio::test]
async fn test_empty_audio_is_rejected_before_engine_starts() {
    let engine = ScriptedEngine::new().emit(RecognitionEvent::EngineStopped);
    let log = engine.log();
    let factory = Arc::new(ScriptedFactory::new(engine));

    let err = service(factory.clone())
        .transcribe_audio(Vec::new(), "en-US")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(factory.created(), 0, "no engine should be created");
    assert_eq!(log.starts(), 0, "engine should never start");
}

#[tokio::test]
async fn test_zero_poll_interval_is_rejected() {
    let factory = Arc::new(ScriptedFactory::new(ScriptedEngine::new()));

    let request =
        TranscriptionRequest::new(wav_bytes()).with_liveness_poll_interval(Duration::ZERO);
    let err = service(factory.clone()).transcribe(request).await.unwrap_err();

    assert!(matches!(err, TranscriptionError::InvalidInput(_)));
    assert_eq!(factory.created(), 0);
}

#[tokio::test]
async fn test_blank_language_uses_default() {
    let engine = ScriptedEngine::new().emit(RecognitionEvent::EngineStopped);
    let log = engine.log();
    let factory = Arc::new(ScriptedFactory::new(engine));

    service(factory).transcribe_audio(wav_bytes(), "  ").await.unwrap();

    assert_eq!(log.language().as_deref(), Some("en-US"));
}

#[tokio::test]
async fn test_language_is_passed_to_engine() {
    let engine = ScriptedEngine::new().emit(RecognitionEvent::EngineStopped);
    let log = engine.log();
    let factory = Arc::new(ScriptedFactory::new(engine));

    service(factory).transcribe_audio(wav_bytes(), "de-DE").await.unwrap();

    assert_eq!(log.language().as_deref(), Some("de-DE"));
}

#[tokio::test]
async fn test_engine_error_maps_to_engine_failure() {
    let engine = ScriptedEngine::new().emit(RecognitionEvent::EngineError {
        code: None,
        detail: "websocket closed".to_string(),
    });
    let factory = Arc::new(ScriptedFactory::new(engine));

    let err = service(factory)
        .transcribe_audio(wav_bytes(), "en-US")
        .await
        .unwrap_err();

    assert_eq!(err, TranscriptionError::EngineFailure("websocket closed".to_string()));
    assert_eq!(err.detail(), "websocket closed");
}

#[tokio::test]
async fn test_start_failure_maps_to_engine_unavailable() {
    let factory = Arc::new(ScriptedFactory::new(
        ScriptedEngine::new().failing_start("malformed audio"),
    ));

    let err = service(factory)
        .transcribe_audio(wav_bytes(), "en-US")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EngineUnavailable);
}

#[tokio::test]
async fn test_factory_failure_maps_to_engine_unavailable() {
    let factory = Arc::new(ScriptedFactory::failing());

    let err = service(factory)
        .transcribe_audio(wav_bytes(), "en-US")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EngineUnavailable);
    assert!(err.detail().contains("no speech credentials"));
}

#[tokio::test(start_paused = true)]
async fn test_per_request_deadline_override() {
    let engine = ScriptedEngine::new().final_text("partial note");
    let factory = Arc::new(ScriptedFactory::new(engine));

    let started = tokio::time::Instant::now();
    let request = TranscriptionRequest::new(wav_bytes())
        .with_language("en-GB")
        .with_session_deadline(Duration::from_secs(3));

    let transcript = service(factory).transcribe(request).await.unwrap();

    assert_eq!(transcript, "partial note");
    assert!(started.elapsed() < Duration::from_secs(25));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_not_an_error() {
    let engine = ScriptedEngine::new().final_text("line1").final_text("line2");
    let factory = Arc::new(ScriptedFactory::new(engine));

    let result = service(factory).transcribe_audio(wav_bytes(), "en-US").await;

    assert_eq!(result, Ok("line1\nline2".to_string()));
}
