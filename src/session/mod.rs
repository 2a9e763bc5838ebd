//! Bounded transcription sessions
//!
//! This module provides the `SessionController` that manages:
//! - Starting a recognition engine and consuming its events
//! - Transcript accumulation with repeated-segment suppression
//! - The race between engine completion, engine errors, the deadline and the liveness poll
//! - Teardown of timers, the engine and its subscription

mod accumulator;
mod config;
mod controller;
mod outcome;
mod stats;

pub use accumulator::TranscriptAccumulator;
pub use config::{SessionConfig, DEFAULT_LANGUAGE};
pub use controller::SessionController;
pub use outcome::SessionOutcome;
pub use stats::{ResolutionTrigger, SessionReport, SessionStats};
