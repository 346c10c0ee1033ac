// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Two-line mixer rendered by the audio callback.

use std::sync::Arc;

use crate::cache::DecodedBuffer;
use crate::session::SessionToken;

use super::line::Voice;

/// Notifications emitted while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEvent {
    /// The one-shot started under this token played to its end
    OneShotEnded(SessionToken),
}

/// Receiver of graph events, called from the render thread
pub type EventSink = Box<dyn FnMut(GraphEvent) + Send>;

/// Which line is sounding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Loop,
    OneShot,
}

/// Loop line plus one-shot line, at most one of them audible
pub struct Mixer {
    loop_line: Option<Voice>,
    one_shot: Option<(Voice, SessionToken)>,
    rate: f64,
    gain: f32,
    output_rate: u32,
    sink: Option<EventSink>,
}

impl Mixer {
    /// Create a silent mixer rendering at `output_rate`
    pub fn new(output_rate: u32) -> Self {
        Self {
            loop_line: None,
            one_shot: None,
            rate: 1.0,
            gain: 1.0,
            output_rate: output_rate.max(1),
            sink: None,
        }
    }

    /// Install the event receiver
    pub fn set_sink(&mut self, sink: EventSink) {
        self.sink = Some(sink);
    }

    pub fn start_loop(&mut self, buffer: Arc<DecodedBuffer>) {
        self.one_shot = None;
        self.loop_line = Some(Voice::looping(buffer));
        debug_assert!(self.audible_lines() <= 1);
    }

    pub fn start_one_shot(&mut self, buffer: Arc<DecodedBuffer>, token: SessionToken) {
        self.loop_line = None;
        self.one_shot = Some((Voice::once(buffer), token));
        debug_assert!(self.audible_lines() <= 1);
    }

    pub fn stop_loop(&mut self) {
        self.loop_line = None;
    }

    /// Stop the one-shot without reporting completion
    pub fn stop_one_shot(&mut self) {
        self.one_shot = None;
    }

    pub fn stop_all(&mut self) {
        self.loop_line = None;
        self.one_shot = None;
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Get output sample rate
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Number of lines currently producing sound
    pub fn audible_lines(&self) -> usize {
        self.loop_line.is_some() as usize + self.one_shot.is_some() as usize
    }

    /// The sounding line, if any
    pub fn active_line(&self) -> Option<Line> {
        match (&self.loop_line, &self.one_shot) {
            (Some(_), _) => Some(Line::Loop),
            (None, Some(_)) => Some(Line::OneShot),
            (None, None) => None,
        }
    }

    /// Fill `out` with interleaved frames
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        out.fill(0.0);

        if let Some(voice) = self.loop_line.as_mut() {
            let step = frame_step(self.rate, voice.buffer(), self.output_rate);
            voice.render(out, channels, step, self.gain);
        }

        let finished = match self.one_shot.as_mut() {
            Some((voice, _)) => {
                let step = frame_step(self.rate, voice.buffer(), self.output_rate);
                voice.render(out, channels, step, self.gain)
            }
            None => false,
        };

        if finished {
            if let Some((_, token)) = self.one_shot.take() {
                if let Some(sink) = self.sink.as_mut() {
                    sink(GraphEvent::OneShotEnded(token));
                }
            }
        }
    }
}

/// Source frames advanced per output frame
fn frame_step(rate: f64, buffer: &DecodedBuffer, output_rate: u32) -> f64 {
    rate * buffer.sample_rate() as f64 / output_rate as f64
}
