use anyhow::Result;
use tokio::sync::mpsc;

/// An event reported by a running recognition engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Provisional text for the segment currently being spoken
    Partial(String),
    /// Settled text for a spoken segment
    Final(String),
    /// A segment was heard but nothing could be recognized
    NoMatch,
    /// The engine aborted the session
    EngineError { code: Option<String>, detail: String },
    /// The engine finished the session on its own
    EngineStopped,
}

impl RecognitionEvent {
    /// Whether the event ends the engine session
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RecognitionEvent::EngineError { .. } | RecognitionEvent::EngineStopped
        )
    }
}

/// Sending half of an engine subscription
///
/// Cheap to clone and safe to use from any thread, including engine callback threads
/// that are not part of the tokio runtime.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<RecognitionEvent>,
}

impl EventSink {
    /// Deliver an event; returns false once the subscriber has gone away
    pub fn emit(&self, event: RecognitionEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Whether the subscriber has released the subscription
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half of an engine subscription, owned by the session controller
///
/// Dropping it unsubscribes from the engine.
#[derive(Debug)]
pub struct EngineSubscription {
    rx: mpsc::UnboundedReceiver<RecognitionEvent>,
}

impl EngineSubscription {
    /// Create a connected sink/subscription pair
    pub fn channel() -> (EventSink, EngineSubscription) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink { tx }, EngineSubscription { rx })
    }

    /// Next event in engine order, or `None` once every sink is dropped
    pub async fn next(&mut self) -> Option<RecognitionEvent> {
        self.rx.recv().await
    }
}

/// Streaming speech recognition engine
///
/// Implementations:
/// - NATS: forwards audio to an STT worker and relays its results
/// - Scripted engines in the test suite
#[async_trait::async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Start continuous recognition of `audio` (a WAV file) in `language`
    ///
    /// Fails if no session can be established (unreachable engine, bad credentials,
    /// malformed audio).
    async fn start(&mut self, audio: &[u8], language: &str) -> Result<EngineSubscription>;

    /// Ask the engine to stop and wait for it to confirm
    ///
    /// Must be idempotent: calling it on a stopped engine returns immediately.
    /// Events may still be delivered before it returns.
    async fn stop(&mut self) -> Result<()>;

    /// Get engine name for logging
    fn name(&self) -> &str;
}

/// Creates a fresh engine for every session
pub trait EngineFactory: Send + Sync {
    /// `session_id` correlates engine-side logs and messages with the session
    fn create(&self, session_id: &str) -> Result<Box<dyn RecognitionEngine>>;
}
