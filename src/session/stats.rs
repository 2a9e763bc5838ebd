use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::outcome::SessionOutcome;

/// Which signal decided a session's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTrigger {
    EngineError,
    EngineStopped,
    Deadline,
    LivenessPoll,
}

/// Statistics about a finished transcription session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: String,

    pub language: String,

    /// Trigger that won the race; `None` if the engine never started
    pub trigger: Option<ResolutionTrigger>,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds, teardown included
    pub duration_secs: f64,

    /// Number of final segments kept in the transcript
    pub segments_count: usize,

    /// Final segments dropped as repeats of the previous one
    pub duplicates_suppressed: usize,

    /// Engine events that arrived after the outcome was decided
    pub late_events_ignored: usize,
}

/// Everything a session run produces
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub stats: SessionStats,
}
