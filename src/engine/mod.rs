//! Streaming speech recognition engines
//!
//! The session controller only sees [`RecognitionEngine`]: start a continuous session,
//! consume [`RecognitionEvent`]s from the returned subscription, stop it.

mod adapter;
mod nats;

pub use adapter::{
    EngineFactory, EngineSubscription, EventSink, RecognitionEngine, RecognitionEvent,
};
pub use nats::{NatsEngineFactory, NatsRecognitionEngine};
