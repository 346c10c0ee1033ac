// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Section catalog access.
//!
//! This module provides a trait-based abstraction over where section
//! audio comes from, allowing different backends (HTTP API, local
//! directory, in-memory) to be used interchangeably.

pub mod dir;
pub mod http;
pub mod memory;

pub use dir::DirSource;
pub use http::HttpSource;
pub use memory::MemorySource;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use thiserror::Error;

/// Raw availability as reported by a catalog: section name -> present
pub type AvailabilityMap = HashMap<String, bool>;

/// Boxed future returned by [`SectionSource`] methods
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'a>>;

/// Identifier of a beat (one rendered style)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeatId(String);

impl BeatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BeatId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BeatId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A beat as listed by the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Beat {
    /// Beat identifier
    pub id: BeatId,
    /// Display title
    pub title: String,
    /// Tempo the sections were rendered at (None = unknown)
    pub tempo: Option<f64>,
}

impl Beat {
    /// Create a beat with a known base tempo
    pub fn new(id: impl Into<BeatId>, tempo: f64) -> Self {
        let id = id.into();
        Self {
            title: id.to_string(),
            id,
            tempo: Some(tempo),
        }
    }

    /// Builder: set title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Catalog access errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Transport-level failure
    #[error("request failed: {0}")]
    Request(String),
    /// Non-success HTTP status
    #[error("server returned status {0}")]
    Status(u16),
    /// No such beat or section
    #[error("not found: {0}")]
    NotFound(String),
    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(String),
    /// Response body did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Source of section availability and section audio bytes.
///
/// Implementations must be shareable across tasks: the player keeps an
/// `Arc<dyn SectionSource>` and clones it into each load.
pub trait SectionSource: Send + Sync {
    /// Report which sections exist for a beat
    fn availability<'a>(&'a self, beat: &'a BeatId) -> SourceFuture<'a, AvailabilityMap>;

    /// Fetch the raw audio bytes at a locator produced by [`section_locator`]
    fn fetch<'a>(&'a self, beat: &'a BeatId, locator: &'a str) -> SourceFuture<'a, Vec<u8>>;
}

/// Deterministic resource locator for a section of a beat.
///
/// Spaces in the catalog's section name become underscores, e.g.
/// `("42", "Fill In AA")` -> `42/Fill_In_AA.wav`.
pub fn section_locator(beat: &BeatId, catalog_name: &str) -> String {
    format!("{}/{}.wav", beat, file_stem(catalog_name))
}

/// File stem used for a section name
pub(crate) fn file_stem(catalog_name: &str) -> String {
    catalog_name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Presence flag as it appears on the wire (`true` or `1`)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Presence {
    Flag(bool),
    Number(i64),
}

impl Presence {
    pub(crate) fn is_present(&self) -> bool {
        match self {
            Presence::Flag(flag) => *flag,
            Presence::Number(n) => *n != 0,
        }
    }
}

/// Normalize a wire presence map
pub(crate) fn presence_map(raw: HashMap<String, Presence>) -> AvailabilityMap {
    raw.into_iter()
        .map(|(name, presence)| (name, presence.is_present()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_locator() {
        let beat = BeatId::new("42");
        assert_eq!(section_locator(&beat, "Main A"), "42/Main_A.wav");
        assert_eq!(section_locator(&beat, "Fill In AA"), "42/Fill_In_AA.wav");
        assert_eq!(section_locator(&beat, "End B"), "42/End_B.wav");
    }

    #[test]
    fn test_beat_builder() {
        let beat = Beat::new("7", 96.0).with_title("Bossa");
        assert_eq!(beat.id.as_str(), "7");
        assert_eq!(beat.title, "Bossa");
        assert_eq!(beat.tempo, Some(96.0));
    }

    #[test]
    fn test_presence_map() {
        let mut raw = HashMap::new();
        raw.insert("Main A".to_string(), Presence::Number(1));
        raw.insert("Main B".to_string(), Presence::Number(0));
        raw.insert("Intro A".to_string(), Presence::Flag(true));

        let map = presence_map(raw);
        assert_eq!(map.get("Main A"), Some(&true));
        assert_eq!(map.get("Main B"), Some(&false));
        assert_eq!(map.get("Intro A"), Some(&true));
    }
}
