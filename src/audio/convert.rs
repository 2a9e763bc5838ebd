//! Sample format conversion for the STT worker, which expects 16kHz mono.

/// Sample rate the STT worker expects
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Fold interleaved multi-channel audio into mono by averaging each frame
pub fn to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Nearest-neighbour resampling of mono audio
///
/// Good enough for speech recognition input; no anti-aliasing filter is applied.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let out_len = (samples.len() as u64 * to_rate as u64 / from_rate as u64) as usize;
    (0..out_len)
        .map(|i| {
            let src = (i as u64 * from_rate as u64 / to_rate as u64) as usize;
            samples[src.min(samples.len() - 1)]
        })
        .collect()
}
