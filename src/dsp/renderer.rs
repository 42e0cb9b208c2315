//! WAV renderer: renders a constant-frequency oscillator tone offline.

use crate::config::{DEFAULT_SAMPLE_RATE, OscillatorConfig};
use crate::error::BandlimitedError;

use super::oscillator::Oscillator;

/// Render `seconds` of `config` at its own frequency and sample rate.
///
/// Configuration diagnostics are logged by the oscillator and otherwise
/// ignored, matching how a live instance degrades.
pub fn render_samples(config: &OscillatorConfig, seconds: f32) -> Result<Vec<f32>, BandlimitedError> {
    let (mut osc, _diagnostics) = Oscillator::new(config)?;
    let len = (seconds.max(0.0) * osc.sample_rate()) as usize;
    let frequency = vec![config.frequency; len];
    let duty = vec![0.5; len];
    let sample_rate = osc.sample_rate();
    osc.render_block(&frequency, &duty, sample_rate)
}

/// Render `seconds` of `config` as a WAV file (16-bit mono PCM).
pub fn render_wav(config: &OscillatorConfig, seconds: f32) -> Result<Vec<u8>, BandlimitedError> {
    let samples = render_samples(config, seconds)?;
    let pcm: Vec<i16> = samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect();
    let sample_rate = if config.sample_rate > 0.0 {
        config.sample_rate as u32
    } else {
        DEFAULT_SAMPLE_RATE as u32
    };
    Ok(encode_wav(&pcm, sample_rate, 1))
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
