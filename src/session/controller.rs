use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::accumulator::TranscriptAccumulator;
use super::config::SessionConfig;
use super::outcome::SessionOutcome;
use super::stats::{ResolutionTrigger, SessionReport, SessionStats};
use crate::engine::{EngineSubscription, RecognitionEngine, RecognitionEvent};
use crate::error::ErrorKind;

/// Lifecycle of a started session
///
/// A controller that has not been `run` yet is the idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPhase {
    Running,
    Resolving,
    Resolved,
}

struct Resolution {
    trigger: ResolutionTrigger,
    outcome: SessionOutcome,
}

struct SessionState {
    phase: SessionPhase,
    accumulator: TranscriptAccumulator,
    /// Resolution latch: taken by the first trigger and consumed by its `send`
    resolver: Option<oneshot::Sender<Resolution>>,
    late_events: usize,
}

/// State shared between the event pump and the timer tasks
struct Shared {
    state: Mutex<SessionState>,
    /// Set when the engine reports it stopped; the liveness poll only ever reads it
    finished: AtomicBool,
}

impl Shared {
    fn new(resolver: oneshot::Sender<Resolution>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                phase: SessionPhase::Running,
                accumulator: TranscriptAccumulator::new(),
                resolver: Some(resolver),
                late_events: 0,
            }),
            finished: AtomicBool::new(false),
        }
    }

    /// Try to decide the session outcome; returns false if another trigger already did
    ///
    /// `decide` runs under the state lock, so it sees the accumulator exactly as it is
    /// frozen for the rest of the session.
    async fn resolve<F>(&self, trigger: ResolutionTrigger, decide: F) -> bool
    where
        F: FnOnce(&TranscriptAccumulator) -> SessionOutcome,
    {
        let mut state = self.state.lock().await;

        let Some(resolver) = state.resolver.take() else {
            debug!("Ignoring {:?}: session already resolved", trigger);
            return false;
        };

        state.phase = SessionPhase::Resolving;
        let outcome = decide(&state.accumulator);

        // The receiver is held by `run` until a resolution arrives
        let _ = resolver.send(Resolution { trigger, outcome });
        true
    }

    /// Apply a non-terminal engine event to the transcript
    async fn apply(&self, event: RecognitionEvent) {
        let mut state = self.state.lock().await;

        if state.phase != SessionPhase::Running {
            state.late_events += 1;
            debug!("Ignoring late engine event: {:?}", event);
            return;
        }

        match event {
            RecognitionEvent::Partial(text) => {
                debug!("Recognizing: {}", text);
                state.accumulator.on_partial(&text);
            }
            RecognitionEvent::Final(text) => {
                if state.accumulator.on_final(&text) {
                    debug!("Recognized: {}", text.trim());
                } else {
                    debug!("Dropped repeated segment: {}", text.trim());
                }
            }
            RecognitionEvent::NoMatch => debug!("No speech could be recognized in segment"),
            RecognitionEvent::EngineError { .. } | RecognitionEvent::EngineStopped => {}
        }
    }

    async fn note_late_event(&self) {
        self.state.lock().await.late_events += 1;
    }
}

/// Drives one recognition session to exactly one [`SessionOutcome`]
///
/// Four triggers race to decide the outcome:
/// - the engine reports an error: the session fails
/// - the engine reports it stopped: the transcript is returned
/// - the deadline expires: the engine is stopped and the transcript so far is returned
/// - the liveness poll sees the engine finished without the session being resolved
///
/// The first one wins. The controller then cancels both timers, stops the engine and
/// drops the event subscription, on every path.
pub struct SessionController {
    engine: Box<dyn RecognitionEngine>,
    config: SessionConfig,
}

impl SessionController {
    pub fn new(engine: Box<dyn RecognitionEngine>, config: SessionConfig) -> Self {
        Self { engine, config }
    }

    /// Run the session to completion
    pub async fn run(mut self, audio: &[u8]) -> SessionReport {
        let started_at = Utc::now();
        let clock = Instant::now();

        info!(
            "Starting transcription session {} (language={}, engine={}, deadline={:?})",
            self.config.session_id,
            self.config.language,
            self.engine.name(),
            self.config.deadline
        );

        // The budget covers engine start-up as well as recognition
        let deadline_at = clock + self.config.deadline;

        let start = self.engine.start(audio, &self.config.language);
        let started = tokio::time::timeout_at(deadline_at, start).await;

        let subscription = match started {
            Ok(Ok(subscription)) => subscription,
            Ok(Err(e)) => {
                error!("Failed to start recognition engine: {:#}", e);
                return self.unavailable(started_at, clock, format!("{:#}", e));
            }
            Err(_) => {
                error!(
                    "Recognition engine did not start within {:?}",
                    self.config.deadline
                );
                return self.unavailable(
                    started_at,
                    clock,
                    format!("Engine did not start within {:?}", self.config.deadline),
                );
            }
        };

        let (resolver, resolution) = oneshot::channel();
        let shared = Arc::new(Shared::new(resolver));

        let pump = tokio::spawn(pump_events(subscription, Arc::clone(&shared)));
        let deadline = tokio::spawn(deadline_timer(Arc::clone(&shared), deadline_at));
        let poll = tokio::spawn(liveness_poll(
            Arc::clone(&shared),
            self.config.liveness_poll_interval.max(Duration::from_millis(1)),
        ));

        let (trigger, outcome) = match resolution.await {
            Ok(Resolution { trigger, outcome }) => (Some(trigger), outcome),
            Err(_) => (
                None,
                SessionOutcome::failed(ErrorKind::EngineFailure, "session ended without an outcome"),
            ),
        };

        info!(
            "Session {} resolved by {:?}, tearing down",
            self.config.session_id, trigger
        );

        cancel(deadline).await;
        cancel(poll).await;
        self.stop_engine().await;
        cancel(pump).await;

        let (accumulator, late_events) = {
            let mut state = shared.state.lock().await;
            state.phase = SessionPhase::Resolved;
            (state.accumulator.clone(), state.late_events)
        };

        let stats = self.stats(started_at, clock, trigger, &accumulator, late_events);

        info!(
            "Session {} finished in {:.1}s ({} segments, {} duplicates suppressed, {} late events ignored)",
            stats.session_id,
            stats.duration_secs,
            stats.segments_count,
            stats.duplicates_suppressed,
            stats.late_events_ignored
        );

        SessionReport { outcome, stats }
    }

    /// Report a session that never got a running engine
    fn unavailable(
        &self,
        started_at: chrono::DateTime<Utc>,
        clock: Instant,
        detail: String,
    ) -> SessionReport {
        SessionReport {
            outcome: SessionOutcome::failed(ErrorKind::EngineUnavailable, detail),
            stats: self.stats(started_at, clock, None, &TranscriptAccumulator::new(), 0),
        }
    }

    /// Best-effort stop; the outcome is already decided, so failures are only logged
    async fn stop_engine(&mut self) {
        let grace = self.config.stop_grace;

        match tokio::time::timeout(grace, self.engine.stop()).await {
            Ok(Ok(())) => debug!("Engine confirmed stop"),
            Ok(Err(e)) => warn!("Engine stop failed during teardown: {:#}", e),
            Err(_) => warn!("Engine did not confirm stop within {:?}", grace),
        }
    }

    fn stats(
        &self,
        started_at: chrono::DateTime<Utc>,
        clock: Instant,
        trigger: Option<ResolutionTrigger>,
        accumulator: &TranscriptAccumulator,
        late_events_ignored: usize,
    ) -> SessionStats {
        SessionStats {
            session_id: self.config.session_id.clone(),
            language: self.config.language.clone(),
            trigger,
            started_at,
            duration_secs: clock.elapsed().as_secs_f64(),
            segments_count: accumulator.segments().len(),
            duplicates_suppressed: accumulator.duplicates_suppressed(),
            late_events_ignored,
        }
    }
}

/// Abort a session task and wait until it is gone
async fn cancel(task: JoinHandle<()>) {
    task.abort();
    if let Err(e) = task.await {
        if !e.is_cancelled() {
            error!("Session task panicked: {}", e);
        }
    }
}

/// Feed engine events into the session in the order the engine reported them
async fn pump_events(mut subscription: EngineSubscription, shared: Arc<Shared>) {
    while let Some(event) = subscription.next().await {
        match event {
            RecognitionEvent::EngineError { code, detail } => {
                warn!("Engine canceled recognition (code={:?}): {}", code, detail);
                if !shared
                    .resolve(ResolutionTrigger::EngineError, |_| {
                        SessionOutcome::failed(ErrorKind::EngineFailure, detail)
                    })
                    .await
                {
                    shared.note_late_event().await;
                }
            }
            RecognitionEvent::EngineStopped => {
                debug!("Engine session stopped");
                shared.finished.store(true, Ordering::SeqCst);
                if !shared
                    .resolve(ResolutionTrigger::EngineStopped, |acc| {
                        SessionOutcome::Transcript(acc.build())
                    })
                    .await
                {
                    shared.note_late_event().await;
                }
            }
            event => shared.apply(event).await,
        }
    }

    // Every sink is gone, nothing more can arrive: same as a normal stop
    if !shared.finished.swap(true, Ordering::SeqCst) {
        debug!("Engine event stream closed without a terminal event");
        shared
            .resolve(ResolutionTrigger::EngineStopped, |acc| {
                SessionOutcome::Transcript(acc.build())
            })
            .await;
    }
}

/// Hard wall-clock budget; running out of time is not an error
async fn deadline_timer(shared: Arc<Shared>, deadline_at: Instant) {
    tokio::time::sleep_until(deadline_at).await;

    if shared
        .resolve(ResolutionTrigger::Deadline, |acc| {
            SessionOutcome::Transcript(acc.build())
        })
        .await
    {
        info!("Forcing transcription to finish at the session deadline");
    }
}

/// Safety net for a lost stop notification
///
/// Only resolves once the engine has been seen to finish, never because time passed.
async fn liveness_poll(shared: Arc<Shared>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);

    loop {
        ticker.tick().await;

        if shared.finished.load(Ordering::SeqCst) {
            if shared
                .resolve(ResolutionTrigger::LivenessPoll, |acc| {
                    SessionOutcome::Transcript(acc.build())
                })
                .await
            {
                warn!("Liveness poll resolved a finished session");
            }
            return;
        }
    }
}
