// Tests for decoding uploaded audio and preparing frames for the STT worker

mod common;

use common::wav_with;
use health_hub_transcription::audio::convert::{resample, to_mono};
use health_hub_transcription::AudioClip;
use std::io::Cursor;

#[test]
fn test_decode_wav_bytes() {
    let clip = AudioClip::from_wav_bytes(&wav_with(16000, 1, 8000)).unwrap();

    assert_eq!(clip.sample_rate, 16000);
    assert_eq!(clip.channels, 1);
    assert_eq!(clip.samples.len(), 8000);
    assert!((clip.duration_seconds - 0.5).abs() < 0.001);
}

#[test]
fn test_garbage_is_rejected() {
    let result = AudioClip::from_wav_bytes(b"definitely not a wav file");
    assert!(result.is_err());
}

#[test]
fn test_float_wav_is_rejected() {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..160 {
            writer.write_sample(0.25f32).unwrap();
        }
        writer.finalize().unwrap();
    }

    let err = AudioClip::from_wav_bytes(&cursor.into_inner()).unwrap_err();
    assert!(err.to_string().contains("Unsupported WAV encoding"));
}

#[test]
fn test_stereo_48khz_is_converted_to_mono_16khz() {
    // One second of 48kHz stereo
    let clip = AudioClip::from_wav_bytes(&wav_with(48000, 2, 48000)).unwrap();

    let converted = clip.to_mono_16khz();

    assert_eq!(converted.sample_rate, 16000);
    assert_eq!(converted.channels, 1);
    assert_eq!(converted.samples.len(), 16000);
    assert!((converted.duration_seconds - 1.0).abs() < 0.001);
}

#[test]
fn test_frames_are_100ms() {
    // 250ms of 16kHz mono
    let clip = AudioClip::from_wav_bytes(&wav_with(16000, 1, 4000)).unwrap();

    let frames = clip.frames(100);

    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].samples.len(), 1600);
    assert_eq!(frames[2].samples.len(), 800, "last frame holds the remainder");
    assert_eq!(frames[1].timestamp_ms, 100);
    assert_eq!(frames[0].duration_ms(), 100);
    assert_eq!(frames[0].to_pcm_bytes().len(), 3200);
}

#[test]
fn test_to_mono_averages_channels() {
    let mono = to_mono(&[100, 300, -200, 200], 2);
    assert_eq!(mono, vec![200, 0]);
}

#[test]
fn test_resample_keeps_matching_rate() {
    let samples = vec![1, 2, 3, 4];
    assert_eq!(resample(&samples, 16000, 16000), samples);
    assert_eq!(resample(&samples, 32000, 16000), vec![1, 3]);
}
