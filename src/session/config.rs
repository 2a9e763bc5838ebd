use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Configuration for a transcription session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "transcription-<uuid>")
    pub session_id: String,

    /// Recognition language tag
    pub language: String,

    /// Hard wall-clock budget; once it expires the engine is stopped and the
    /// transcript collected so far is returned
    /// Default: 25 seconds
    pub deadline: Duration,

    /// How often the liveness poll checks for a finished session it was not told about
    /// Default: 1 second
    pub liveness_poll_interval: Duration,

    /// How long teardown waits for the engine to confirm a stop
    /// Default: 2 seconds
    pub stop_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("transcription-{}", uuid::Uuid::new_v4()),
            language: DEFAULT_LANGUAGE.to_string(),
            deadline: Duration::from_secs(25),
            liveness_poll_interval: Duration::from_secs(1),
            stop_grace: Duration::from_secs(2),
        }
    }
}
