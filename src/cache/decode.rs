// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! WAV decoding into interleaved f32 PCM.

use std::io::Cursor;
use std::time::Duration;

use hound::{SampleFormat, WavReader};
use thiserror::Error;

/// Decoded samples of one section
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBuffer {
    /// Interleaved samples in [-1.0, 1.0]
    samples: Vec<f32>,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Channel count
    channels: u16,
}

impl DecodedBuffer {
    /// Create a buffer from interleaved samples
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Get interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get channel count
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Playback length at the native sample rate
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Sample at frame/channel (channel clamped to the last one)
    #[inline]
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let channels = self.channels as usize;
        let channel = channel.min(channels.saturating_sub(1));
        self.samples
            .get(frame * channels + channel)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid WAV data: {0}")]
    Wav(#[from] hound::Error),
    #[error("WAV has no channels")]
    NoChannels,
    #[error("WAV declares a sample rate of 0 Hz")]
    NoSampleRate,
    #[error("WAV contains no audio frames")]
    Empty,
}

/// Decode WAV bytes (integer or float PCM)
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedBuffer, DecodeError> {
    let mut reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(DecodeError::NoChannels);
    }
    if spec.sample_rate == 0 {
        return Err(DecodeError::NoSampleRate);
    }

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let buffer = DecodedBuffer::new(samples, spec.sample_rate, spec.channels);
    if buffer.frames() == 0 {
        return Err(DecodeError::Empty);
    }
    Ok(buffer)
}
