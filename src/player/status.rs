// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Observable player outputs.

use crate::error::{EngineError, Severity};
use crate::policy::PlayerState;
use crate::section::Section;

/// Snapshot returned by `Player::status`
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub state: PlayerState,
    pub is_playing: bool,
    /// Section playing, or about to play once loaded
    pub active_section: Option<Section>,
    /// A buffer or the availability table is still being fetched
    pub is_loading: bool,
    /// Tempo in BPM
    pub tempo: f64,
    /// Volume percentage
    pub volume: f64,
    /// Effective playback rate
    pub rate: f64,
    /// Effective linear gain
    pub gain: f32,
    /// Lines currently sounding (never more than one)
    pub audible_lines: usize,
}

/// User-visible report of a rejected command or failed load
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub error: EngineError,
}

impl Notice {
    pub fn new(error: EngineError) -> Self {
        Self {
            severity: error.severity(),
            error,
        }
    }

    /// Message suitable for display
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}
