use anyhow::{bail, Context, Result};
use futures::stream::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::adapter::{
    EngineFactory, EngineSubscription, EventSink, RecognitionEngine, RecognitionEvent,
};
use crate::audio::{AudioClip, AudioFrame};
use crate::nats::{route_result, NatsClient};

/// Duration of each published audio frame
const FRAME_MS: u64 = 100;

/// Recognition engine backed by an STT worker reachable over NATS
///
/// Audio is published as 16kHz mono PCM frames; partial and final transcripts and
/// session lifecycle events are relayed back from a single subscription.
pub struct NatsRecognitionEngine {
    url: String,
    session_id: String,
    client: Option<Arc<NatsClient>>,
    /// Flipped to true once the worker reports a terminal session event
    stopped: Arc<watch::Sender<bool>>,
    stop_requested: bool,
    tasks: Vec<JoinHandle<()>>,
}

impl NatsRecognitionEngine {
    pub fn new(url: impl Into<String>, session_id: impl Into<String>) -> Self {
        let (stopped, _) = watch::channel(false);

        Self {
            url: url.into(),
            session_id: session_id.into(),
            client: None,
            stopped: Arc::new(stopped),
            stop_requested: false,
            tasks: Vec::new(),
        }
    }

    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for NatsRecognitionEngine {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

#[async_trait::async_trait]
impl RecognitionEngine for NatsRecognitionEngine {
    async fn start(&mut self, audio: &[u8], language: &str) -> Result<EngineSubscription> {
        if self.client.is_some() {
            bail!("Engine session {} already started", self.session_id);
        }

        let clip = AudioClip::from_wav_bytes(audio)
            .context("Malformed audio")?
            .to_mono_16khz();

        let client = Arc::new(
            NatsClient::connect(&self.url, self.session_id.clone())
                .await
                .context("Failed to connect to STT engine")?,
        );

        let results = client
            .subscribe_results()
            .await?
            .map(|msg| (msg.subject.to_string(), msg.payload.to_vec()));
        let (sink, subscription) = EngineSubscription::channel();

        self.tasks.push(tokio::spawn(relay_results(
            results,
            self.session_id.clone(),
            sink.clone(),
            Arc::clone(&self.stopped),
        )));

        self.tasks.push(tokio::spawn(publish_audio(
            Arc::clone(&client),
            clip,
            language.to_string(),
            sink,
        )));

        self.client = Some(client);

        info!(
            "Recognition started for {} (language={})",
            self.session_id, language
        );

        Ok(subscription)
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(client) = self.client.clone() else {
            return Ok(());
        };

        if *self.stopped.borrow() {
            self.abort_tasks();
            return Ok(());
        }

        if !self.stop_requested {
            self.stop_requested = true;
            client.publish_stop().await?;
        }

        let mut confirmed = self.stopped.subscribe();
        confirmed
            .wait_for(|stopped| *stopped)
            .await
            .context("Engine went away before confirming stop")?;

        self.abort_tasks();
        info!("Recognition stopped for {}", self.session_id);

        Ok(())
    }

    fn name(&self) -> &str {
        "nats"
    }
}

/// Relay STT worker output for one session into the subscription
///
/// Stops after the first terminal event, once `stopped` has been flipped for `stop()`.
async fn relay_results<S>(
    mut results: S,
    session_id: String,
    sink: EventSink,
    stopped: Arc<watch::Sender<bool>>,
) where
    S: Stream<Item = (String, Vec<u8>)> + Unpin,
{
    while let Some((subject, payload)) = results.next().await {
        let Some(event) = route_result(&subject, &payload, &session_id) else {
            continue;
        };

        let terminal = event.is_terminal();
        if terminal {
            stopped.send_replace(true);
        }

        if !sink.emit(event) || terminal {
            break;
        }
    }
}

/// Publish the clip frame by frame, then the final marker frame
async fn publish_audio(client: Arc<NatsClient>, clip: AudioClip, language: String, sink: EventSink) {
    let frames = clip.frames(FRAME_MS);
    let total = frames.len() as u32;
    let end_ms = frames
        .last()
        .map(|frame| frame.timestamp_ms + frame.duration_ms())
        .unwrap_or(0);

    for (sequence, frame) in frames.iter().enumerate() {
        if sink.is_closed() {
            return;
        }

        if let Err(e) = client
            .publish_audio_frame(frame, sequence as u32, &language, false)
            .await
        {
            error!("Failed to publish audio frame: {}", e);
            sink.emit(RecognitionEvent::EngineError {
                code: Some("audio_publish_failed".to_string()),
                detail: format!("{:#}", e),
            });
            return;
        }
    }

    let marker = AudioFrame {
        samples: Vec::new(),
        sample_rate: clip.sample_rate,
        channels: clip.channels,
        timestamp_ms: end_ms,
    };

    if let Err(e) = client
        .publish_audio_frame(&marker, total, &language, true)
        .await
    {
        error!("Failed to send final frame: {}", e);
    }
}

/// Creates a [`NatsRecognitionEngine`] per session
pub struct NatsEngineFactory {
    nats_url: String,
}

impl NatsEngineFactory {
    pub fn new(nats_url: impl Into<String>) -> Self {
        Self {
            nats_url: nats_url.into(),
        }
    }
}

impl EngineFactory for NatsEngineFactory {
    fn create(&self, session_id: &str) -> Result<Box<dyn RecognitionEngine>> {
        Ok(Box::new(NatsRecognitionEngine::new(
            self.nats_url.clone(),
            session_id,
        )))
    }
}
