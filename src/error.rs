// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types surfaced by the playback engine.

use thiserror::Error;

use crate::section::Section;

/// Errors reported at the player boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The section is absent from the current beat's availability table
    #[error("{0} is not available for this beat")]
    SectionUnavailable(Section),
    /// Fetching the section's audio failed
    #[error("failed to fetch {section}: {reason}")]
    FetchFailed { section: Section, reason: String },
    /// The fetched bytes could not be decoded
    #[error("failed to decode {section}: {reason}")]
    DecodeFailed { section: Section, reason: String },
    /// The beat has no Main section at all
    #[error("this beat has no playable Main section")]
    NoPlayableMain,
    /// A control was used before any beat was selected
    #[error("no beat selected")]
    NoBeatSelected,
    /// The availability request for the selected beat failed
    #[error("failed to resolve sections: {0}")]
    AvailabilityFailed(String),
    /// Tempo must be finite and positive
    #[error("invalid tempo: {0}")]
    InvalidTempo(f64),
    /// Volume must be a finite percentage
    #[error("invalid volume: {0}")]
    InvalidVolume(f64),
}

impl EngineError {
    /// How prominently a UI should surface this error
    pub fn severity(&self) -> Severity {
        match self {
            EngineError::NoPlayableMain => Severity::Blocking,
            EngineError::FetchFailed { .. }
            | EngineError::DecodeFailed { .. }
            | EngineError::AvailabilityFailed(_) => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Expected rejection (disabled control, nothing selected)
    Info,
    /// Non-fatal failure, playback returned to stopped
    Warning,
    /// Playback cannot start for this beat
    Blocking,
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
