//! WAV packaging for service payloads, plus the sample-format helpers
//! the microphone backend's native-config fallback uses.

use crate::audio::source::Sample;
use crate::defaults;
use crate::error::{Result, VoxrelayError};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

/// Encode an i16 sample buffer as an in-memory mono WAV.
///
/// The transcription request carries the finished capture buffer as a
/// WAV payload so the service sees a self-describing format. Samples
/// are passed through untouched; no resampling happens here.
pub fn encode_wav(samples: &[Sample], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: defaults::CHANNELS,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer =
            WavWriter::new(&mut buffer, spec).map_err(|e| VoxrelayError::AudioEncoding {
                message: format!("Failed to create WAV writer: {}", e),
            })?;

        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| VoxrelayError::AudioEncoding {
                    message: format!("Failed to write sample: {}", e),
                })?;
        }

        writer
            .finalize()
            .map_err(|e| VoxrelayError::AudioEncoding {
                message: format!("Failed to finalize WAV: {}", e),
            })?;
    }

    Ok(buffer.into_inner())
}

/// Mix interleaved multi-channel audio down to mono by averaging.
pub fn mix_to_mono(samples: &[Sample], channels: usize) -> Vec<Sample> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as Sample
        })
        .collect()
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[Sample], from_rate: u32, to_rate: u32) -> Vec<Sample> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let src_pos = i as f64 * ratio;
            let idx = src_pos as usize;
            if idx + 1 < samples.len() {
                let frac = src_pos - idx as f64;
                let a = samples[idx] as f64;
                let b = samples[idx + 1] as f64;
                (a + (b - a) * frac) as Sample
            } else {
                samples[samples.len() - 1]
            }
        })
        .collect()
}
