use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::RecognitionEvent;

/// Subject prefix for everything the STT worker publishes
pub const STT_SUBJECTS: &str = "stt.>";

pub fn audio_subject(session_id: &str) -> String {
    format!("audio.frame.{}", session_id)
}

pub fn session_subject(session_id: &str) -> String {
    format!("stt.session.{}", session_id)
}

pub fn control_subject(session_id: &str) -> String {
    format!("stt.control.{}", session_id)
}

/// Subject prefix of worker transcripts (`stt.text.partial` / `stt.text.final`)
pub const TRANSCRIPT_SUBJECT_PREFIX: &str = "stt.text.";

/// Decode one message from the STT worker into an event for `session_id`
///
/// Returns `None` for traffic that belongs to other sessions, for control messages
/// and for payloads that do not parse.
pub fn route_result(subject: &str, payload: &[u8], session_id: &str) -> Option<RecognitionEvent> {
    if subject.starts_with(TRANSCRIPT_SUBJECT_PREFIX) {
        match serde_json::from_slice::<TranscriptMessage>(payload) {
            Ok(transcript) if transcript.session_id == session_id => Some(transcript.into_event()),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to parse transcript message: {}", e);
                None
            }
        }
    } else if subject == session_subject(session_id) {
        match serde_json::from_slice::<SessionEventMessage>(payload) {
            Ok(session_event) => Some(session_event.into_event()),
            Err(e) => {
                warn!("Failed to parse session event: {}", e);
                None
            }
        }
    } else {
        None
    }
}

/// Audio frame message published to NATS
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioFrameMessage {
    pub session_id: String,
    pub sequence: u32,
    pub pcm: String, // Base64-encoded PCM bytes
    pub sample_rate: u32,
    pub channels: u16,
    pub language: String,
    pub timestamp: String, // RFC3339 timestamp
    #[serde(rename = "final")]
    pub final_frame: bool,
}

/// Transcript message received from the STT worker (`stt.text.partial` / `stt.text.final`)
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: String,
    pub text: String,
    pub partial: bool,
    pub timestamp: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl TranscriptMessage {
    pub fn into_event(self) -> RecognitionEvent {
        if self.partial {
            RecognitionEvent::Partial(self.text)
        } else {
            RecognitionEvent::Final(self.text)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    /// Nothing more was recognized for the given speech
    NoMatch,
    /// The worker finished the session
    Stopped,
    /// The worker ended the session early; see `reason`
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationReason {
    Error,
    EndOfStream,
}

/// Session lifecycle message received from the STT worker (`stt.session.<id>`)
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionEventMessage {
    pub session_id: String,
    pub kind: SessionEventKind,
    #[serde(default)]
    pub reason: Option<CancellationReason>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_detail: Option<String>,
}

impl SessionEventMessage {
    /// Map to a recognition event
    ///
    /// A cancellation that is not an error (end of stream) is a normal stop.
    pub fn into_event(self) -> RecognitionEvent {
        match (self.kind, self.reason) {
            (SessionEventKind::NoMatch, _) => RecognitionEvent::NoMatch,
            (SessionEventKind::Canceled, Some(CancellationReason::Error)) => {
                RecognitionEvent::EngineError {
                    code: self.error_code,
                    detail: self
                        .error_detail
                        .unwrap_or_else(|| "recognition canceled".to_string()),
                }
            }
            (SessionEventKind::Stopped, _) | (SessionEventKind::Canceled, _) => {
                RecognitionEvent::EngineStopped
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCommand {
    Stop,
}

/// Control message published to the STT worker (`stt.control.<id>`)
#[derive(Debug, Serialize, Deserialize)]
pub struct ControlMessage {
    pub session_id: String,
    pub command: ControlCommand,
    pub timestamp: String,
}
