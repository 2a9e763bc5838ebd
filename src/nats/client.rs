use anyhow::{Context, Result};
use async_nats::Client;
use base64::Engine;
use tracing::{debug, info};

use super::messages::{
    audio_subject, control_subject, AudioFrameMessage, ControlCommand, ControlMessage,
    STT_SUBJECTS,
};
use crate::audio::AudioFrame;

pub struct NatsClient {
    client: Client,
    session_id: String,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str, session_id: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client, session_id })
    }

    /// Publish audio frame to NATS
    pub async fn publish_audio_frame(
        &self,
        frame: &AudioFrame,
        sequence: u32,
        language: &str,
        is_final: bool,
    ) -> Result<()> {
        let subject = audio_subject(&self.session_id);
        let pcm_bytes = frame.to_pcm_bytes();

        let message = AudioFrameMessage {
            session_id: self.session_id.clone(),
            sequence,
            pcm: base64::engine::general_purpose::STANDARD.encode(&pcm_bytes),
            sample_rate: frame.sample_rate,
            channels: frame.channels,
            language: language.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            final_frame: is_final,
        };

        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish audio frame")?;

        debug!(
            "Published audio frame to {} (sequence={}, bytes={}, final={})",
            subject,
            sequence,
            pcm_bytes.len(),
            is_final
        );

        Ok(())
    }

    /// Ask the STT worker to stop recognizing this session
    pub async fn publish_stop(&self) -> Result<()> {
        let subject = control_subject(&self.session_id);

        let message = ControlMessage {
            session_id: self.session_id.clone(),
            command: ControlCommand::Stop,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish stop command")?;
        self.client
            .flush()
            .await
            .context("Failed to flush stop command")?;

        info!("Requested stop on {}", subject);

        Ok(())
    }

    /// Subscribe to everything the STT worker publishes
    ///
    /// Transcripts and session events share one subscription so they arrive in the
    /// order the worker published them. Callers route by subject and filter by session id.
    pub async fn subscribe_results(&self) -> Result<async_nats::Subscriber> {
        info!("Subscribing to STT results on {}", STT_SUBJECTS);

        let subscriber = self
            .client
            .subscribe(STT_SUBJECTS)
            .await
            .context("Failed to subscribe to STT results")?;

        Ok(subscriber)
    }
}
