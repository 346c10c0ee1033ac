// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback graph.
//!
//! This module provides:
//! - A loop line (one buffer, repeated until stopped)
//! - A one-shot line (one buffer, played once, end reported with its token)
//! - Shared playback rate and gain applied to whichever line is sounding
//! - Audio output via cpal
//!
//! Starting either line stops the other, so at most one is ever audible.

pub mod line;
pub mod mixer;
pub mod output;

pub use mixer::{EventSink, GraphEvent, Line, Mixer};
pub use output::{AudioConfig, AudioError, AudioOutput};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::cache::DecodedBuffer;
use crate::session::SessionToken;

/// Lowest playback rate
pub const MIN_RATE: f64 = 0.25;
/// Highest playback rate
pub const MAX_RATE: f64 = 4.0;

/// Playback rate for a tempo relative to the tempo the section was rendered at
pub fn playback_rate(tempo: f64, base_tempo: f64, min_rate: f64, max_rate: f64) -> f64 {
    if base_tempo <= 0.0 || !base_tempo.is_finite() {
        return 1.0_f64.clamp(min_rate, max_rate);
    }
    (tempo / base_tempo).clamp(min_rate, max_rate)
}

/// Linear gain for a volume percentage
pub fn gain_from_percent(percent: f64) -> f32 {
    (percent / 100.0).clamp(0.0, 1.0) as f32
}

fn lock(mixer: &Mutex<Mixer>) -> MutexGuard<'_, Mixer> {
    mixer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of the two playback lines.
///
/// Only the owner starts and stops lines; the audio callback renders
/// through a [`GraphRenderer`].
pub struct PlaybackGraph {
    mixer: Arc<Mutex<Mixer>>,
}

impl PlaybackGraph {
    /// Create a silent graph rendering at `output_rate`
    pub fn new(output_rate: u32) -> Self {
        Self {
            mixer: Arc::new(Mutex::new(Mixer::new(output_rate))),
        }
    }

    /// Builder: install the event receiver
    pub fn with_sink(self, sink: EventSink) -> Self {
        lock(&self.mixer).set_sink(sink);
        self
    }

    /// Loop `buffer` from its start, stopping whatever was playing
    pub fn start_loop(&self, buffer: Arc<DecodedBuffer>, rate: f64, gain: f32) {
        let mut mixer = lock(&self.mixer);
        mixer.set_rate(rate);
        mixer.set_gain(gain);
        mixer.start_loop(buffer);
        trace!(rate, gain, "loop line started");
    }

    /// Silence the loop line; a sounding one-shot is left alone
    pub fn stop_loop(&self) {
        lock(&self.mixer).stop_loop();
    }

    /// Play `buffer` once under `token`, stopping whatever was playing
    pub fn start_one_shot(&self, buffer: Arc<DecodedBuffer>, rate: f64, gain: f32, token: SessionToken) {
        let mut mixer = lock(&self.mixer);
        mixer.set_rate(rate);
        mixer.set_gain(gain);
        mixer.start_one_shot(buffer, token);
        trace!(rate, gain, %token, "one-shot line started");
    }

    /// Stop the one-shot; no end event is emitted for it
    pub fn stop_one_shot(&self) {
        lock(&self.mixer).stop_one_shot();
    }

    pub fn stop_all(&self) {
        lock(&self.mixer).stop_all();
    }

    /// Change rate of the sounding line without restarting it
    pub fn set_rate(&self, rate: f64) {
        lock(&self.mixer).set_rate(rate);
    }

    /// Change gain of the sounding line without restarting it
    pub fn set_gain(&self, gain: f32) {
        lock(&self.mixer).set_gain(gain);
    }

    pub fn rate(&self) -> f64 {
        lock(&self.mixer).rate()
    }

    pub fn gain(&self) -> f32 {
        lock(&self.mixer).gain()
    }

    /// Number of audible lines (0 or 1)
    pub fn audible_lines(&self) -> usize {
        lock(&self.mixer).audible_lines()
    }

    pub fn active_line(&self) -> Option<Line> {
        lock(&self.mixer).active_line()
    }

    /// Render interleaved frames into `out`
    pub fn render(&self, out: &mut [f32], channels: usize) {
        lock(&self.mixer).render(out, channels);
    }

    /// Render handle for an audio callback
    pub fn renderer(&self) -> GraphRenderer {
        GraphRenderer {
            mixer: Arc::clone(&self.mixer),
        }
    }
}

/// Render-only view of a [`PlaybackGraph`]
#[derive(Clone)]
pub struct GraphRenderer {
    mixer: Arc<Mutex<Mixer>>,
}

impl GraphRenderer {
    /// Render interleaved frames into `out`
    pub fn render(&self, out: &mut [f32], channels: usize) {
        lock(&self.mixer).render(out, channels);
    }
}
