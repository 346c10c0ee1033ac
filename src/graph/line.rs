// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! A single playing buffer.

use std::sync::Arc;

use crate::cache::DecodedBuffer;

/// Playback cursor over one decoded buffer
#[derive(Debug, Clone)]
pub struct Voice {
    buffer: Arc<DecodedBuffer>,
    /// Fractional frame position
    position: f64,
    looping: bool,
}

impl Voice {
    /// Voice that repeats forever
    pub fn looping(buffer: Arc<DecodedBuffer>) -> Self {
        Self {
            buffer,
            position: 0.0,
            looping: true,
        }
    }

    /// Voice that plays once
    pub fn once(buffer: Arc<DecodedBuffer>) -> Self {
        Self {
            buffer,
            position: 0.0,
            looping: false,
        }
    }

    /// Get buffer
    pub fn buffer(&self) -> &Arc<DecodedBuffer> {
        &self.buffer
    }

    /// Get position in frames
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Check if looping
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Mix interleaved frames into `out`, advancing `step` source frames per
    /// output frame. Returns true once a one-shot voice has run off its end.
    pub fn render(&mut self, out: &mut [f32], channels: usize, step: f64, gain: f32) -> bool {
        let frames = self.buffer.frames();
        // A cursor that cannot advance would hold a one-shot open forever
        if frames == 0 || channels == 0 || !step.is_finite() || step <= 0.0 {
            return !self.looping;
        }
        let len = frames as f64;

        for frame in out.chunks_mut(channels) {
            if self.position >= len {
                if self.looping {
                    self.position %= len;
                } else {
                    return true;
                }
            }

            let index = self.position as usize;
            let frac = (self.position - index as f64) as f32;
            let next = if index + 1 < frames {
                index + 1
            } else if self.looping {
                0
            } else {
                index
            };

            for (ch, sample) in frame.iter_mut().enumerate() {
                let a = self.buffer.sample(index, ch);
                let b = self.buffer.sample(next, ch);
                *sample += (a + (b - a) * frac) * gain;
            }
            self.position += step;
        }

        !self.looping && self.position >= len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize) -> Arc<DecodedBuffer> {
        let samples = (0..frames).map(|i| i as f32 / frames as f32).collect();
        Arc::new(DecodedBuffer::new(samples, 100, 1))
    }

    #[test]
    fn test_one_shot_finishes_once_past_end() {
        let mut voice = Voice::once(ramp(4));
        let mut out = vec![0.0; 10];

        assert!(!voice.render(&mut out[..2], 2, 1.0, 1.0));
        assert!(voice.render(&mut out[2..], 2, 1.0, 1.0));
        // Mono duplicated on both channels
        assert_eq!(out[2], out[3]);
        assert!((out[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_loop_wraps_to_start() {
        let mut voice = Voice::looping(ramp(4));
        let mut out = vec![0.0; 6];

        assert!(!voice.render(&mut out, 1, 1.0, 1.0));
        assert_eq!(out[4], 0.0);
        assert!((out[5] - 0.25).abs() < 1e-6);
        assert!((voice.position() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_stalled_step_ends_one_shot() {
        let mut out = vec![0.0; 4];

        assert!(Voice::once(ramp(4)).render(&mut out, 1, 0.0, 1.0));
        assert!(Voice::once(ramp(4)).render(&mut out, 1, f64::NAN, 1.0));

        let mut looping = Voice::looping(ramp(4));
        assert!(!looping.render(&mut out, 1, -1.0, 1.0));
        assert_eq!(looping.position(), 0.0);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_interpolation_and_gain() {
        let mut voice = Voice::once(ramp(4));
        let mut out = vec![0.0; 2];

        voice.render(&mut out, 1, 0.5, 0.5);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.0625).abs() < 1e-6);
    }
}
