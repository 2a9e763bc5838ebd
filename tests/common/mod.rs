// Scripted recognition engine shared by the integration tests
//
// Plays a fixed sequence of events (with optional pauses) after `start`, and records
// what the session controller did to it.

#![allow(dead_code)]

use anyhow::{bail, Result};
use health_hub_transcription::{
    EngineFactory, EngineSubscription, EventSink, RecognitionEngine, RecognitionEvent,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub enum Step {
    Emit(RecognitionEvent),
    Wait(Duration),
}

/// What happened to a scripted engine
#[derive(Debug, Default)]
pub struct EngineLog {
    pub starts: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub language: Mutex<Option<String>>,
    sink: Mutex<Option<EventSink>>,
}

impl EngineLog {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn language(&self) -> Option<String> {
        self.language.lock().unwrap().clone()
    }

    /// Whether the controller dropped its event subscription
    pub fn subscription_released(&self) -> bool {
        self.sink
            .lock()
            .unwrap()
            .as_ref()
            .map(|sink| sink.is_closed())
            .unwrap_or(true)
    }
}

#[derive(Clone, Default)]
pub struct ScriptedEngine {
    script: Vec<Step>,
    on_stop: Vec<RecognitionEvent>,
    fail_start: Option<String>,
    fail_stop: bool,
    start_delay: Option<Duration>,
    stop_delay: Option<Duration>,
    close_after_script: bool,
    log: Arc<EngineLog>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(mut self, event: RecognitionEvent) -> Self {
        self.script.push(Step::Emit(event));
        self
    }

    pub fn final_text(self, text: &str) -> Self {
        self.emit(RecognitionEvent::Final(text.to_string()))
    }

    pub fn wait(mut self, duration: Duration) -> Self {
        self.script.push(Step::Wait(duration));
        self
    }

    /// Events delivered while `stop` is in progress
    pub fn on_stop(mut self, event: RecognitionEvent) -> Self {
        self.on_stop.push(event);
        self
    }

    pub fn failing_start(mut self, message: &str) -> Self {
        self.fail_start = Some(message.to_string());
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Take `delay` to establish the session
    pub fn slow_start(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    pub fn slow_stop(mut self, delay: Duration) -> Self {
        self.stop_delay = Some(delay);
        self
    }

    /// Drop every sender once the script has played, closing the event stream
    pub fn close_after_script(mut self) -> Self {
        self.close_after_script = true;
        self
    }

    pub fn log(&self) -> Arc<EngineLog> {
        Arc::clone(&self.log)
    }

    pub fn boxed(self) -> Box<dyn RecognitionEngine> {
        Box::new(RunningScript {
            engine: self,
            sink: None,
            task: None,
        })
    }
}

struct RunningScript {
    engine: ScriptedEngine,
    sink: Option<EventSink>,
    task: Option<JoinHandle<()>>,
}

#[async_trait::async_trait]
impl RecognitionEngine for RunningScript {
    async fn start(&mut self, _audio: &[u8], language: &str) -> Result<EngineSubscription> {
        let log = &self.engine.log;
        log.starts.fetch_add(1, Ordering::SeqCst);
        *log.language.lock().unwrap() = Some(language.to_string());

        if let Some(delay) = self.engine.start_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.engine.fail_start {
            bail!("{}", message);
        }

        let (sink, subscription) = EngineSubscription::channel();

        if !self.engine.close_after_script {
            *log.sink.lock().unwrap() = Some(sink.clone());
            self.sink = Some(sink.clone());
        }

        let script = self.engine.script.clone();
        self.task = Some(tokio::spawn(async move {
            for step in script {
                match step {
                    Step::Emit(event) => {
                        sink.emit(event);
                    }
                    Step::Wait(duration) => tokio::time::sleep(duration).await,
                }
            }
        }));

        Ok(subscription)
    }

    async fn stop(&mut self) -> Result<()> {
        self.engine.log.stop_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.engine.stop_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(sink) = &self.sink {
            for event in &self.engine.on_stop {
                sink.emit(event.clone());
            }
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }

        if self.engine.fail_stop {
            bail!("stop confirmation failed");
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Hands out a copy of the same script for every session
pub struct ScriptedFactory {
    engine: ScriptedEngine,
    fail: bool,
    pub created: AtomicUsize,
}

impl ScriptedFactory {
    pub fn new(engine: ScriptedEngine) -> Self {
        Self {
            engine,
            fail: false,
            created: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            engine: ScriptedEngine::new(),
            fail: true,
            created: AtomicUsize::new(0),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl EngineFactory for ScriptedFactory {
    fn create(&self, _session_id: &str) -> Result<Box<dyn RecognitionEngine>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("no speech credentials configured");
        }
        Ok(self.engine.clone().boxed())
    }
}

/// One second of 16kHz mono silence as a WAV file
pub fn wav_bytes() -> Vec<u8> {
    wav_with(16000, 1, 16000)
}

pub fn wav_with(sample_rate: u32, channels: u16, frames: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames * channels as usize {
            writer.write_sample((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}
