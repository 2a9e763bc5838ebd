pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod nats;
pub mod service;
pub mod session;

pub use audio::{AudioClip, AudioFrame};
pub use config::Config;
pub use engine::{
    EngineFactory, EngineSubscription, EventSink, NatsEngineFactory, NatsRecognitionEngine,
    RecognitionEngine, RecognitionEvent,
};
pub use error::{ErrorKind, TranscriptionError, TranscriptionResult};
pub use http::{create_router, AppState};
pub use service::{TranscriptionRequest, TranscriptionService};
pub use session::{
    ResolutionTrigger, SessionConfig, SessionController, SessionOutcome, SessionReport,
    SessionStats, TranscriptAccumulator,
};
