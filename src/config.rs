use anyhow::{Context, Result};
use serde::Deserialize;

use crate::session::DEFAULT_LANGUAGE;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub transcription: TranscriptionConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Global session defaults; every timing knob can be overridden per request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub default_language: String,
    pub session_deadline_ms: u64,
    pub liveness_poll_interval_ms: u64,
    pub stop_grace_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// NATS server the STT worker listens on
    pub nats_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "health-hub-transcription".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
            session_deadline_ms: 25_000,
            liveness_poll_interval_ms: 1_000,
            stop_grace_ms: 2_000,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://localhost:4222".to_string(),
        }
    }
}

impl Config {
    /// Load `path` (any format the `config` crate knows, extension optional) and
    /// `HEALTH_HUB_*` environment overrides, e.g. `HEALTH_HUB_SPEECH__NATS_URL`
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("HEALTH_HUB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to load configuration from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}
