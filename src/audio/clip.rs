use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};
use std::io::Cursor;
use tracing::debug;

use super::convert::{resample, to_mono, TARGET_SAMPLE_RATE};
use super::frame::AudioFrame;

/// Decoded audio held in memory
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioClip {
    /// Decode an uploaded WAV file
    ///
    /// Only 16-bit integer PCM is accepted; anything else is reported as malformed.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = WavReader::new(Cursor::new(bytes)).context("Failed to parse WAV header")?;

        let spec = reader.spec();
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            bail!(
                "Unsupported WAV encoding: {}-bit {:?}, expected 16-bit PCM",
                spec.bits_per_sample,
                spec.sample_format
            );
        }

        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        debug!(
            "Audio decoded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Convert to the 16kHz mono layout the STT worker expects
    pub fn to_mono_16khz(&self) -> AudioClip {
        let mono = to_mono(&self.samples, self.channels);
        let samples = resample(&mono, self.sample_rate, TARGET_SAMPLE_RATE);

        AudioClip {
            duration_seconds: samples.len() as f64 / TARGET_SAMPLE_RATE as f64,
            sample_rate: TARGET_SAMPLE_RATE,
            channels: 1,
            samples,
        }
    }

    /// Split the clip into consecutive frames of `frame_ms` milliseconds
    ///
    /// The last frame may be shorter.
    pub fn frames(&self, frame_ms: u64) -> Vec<AudioFrame> {
        let per_frame =
            (self.sample_rate as u64 * self.channels as u64 * frame_ms / 1000).max(1) as usize;

        self.samples
            .chunks(per_frame)
            .enumerate()
            .map(|(i, chunk)| AudioFrame {
                samples: chunk.to_vec(),
                sample_rate: self.sample_rate,
                channels: self.channels,
                timestamp_ms: i as u64 * frame_ms,
            })
            .collect()
    }
}
