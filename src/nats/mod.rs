pub mod client;
pub mod messages;

pub use client::NatsClient;
pub use messages::{
    route_result, AudioFrameMessage, ControlCommand, ControlMessage, SessionEventMessage,
    TranscriptMessage,
};
