// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Decoded section cache.
//!
//! Buffers are keyed by `(BeatId, Section)`, created on first request and
//! never mutated afterwards. Concurrent loads of the same key may both
//! fetch; the first insert wins and later ones get the stored buffer.

pub mod decode;

pub use decode::{decode_wav, DecodeError, DecodedBuffer};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::catalog::{BeatId, SectionSource};
use crate::error::EngineError;
use crate::section::Section;

type CacheMap = HashMap<(BeatId, Section), Arc<DecodedBuffer>>;

/// Shared cache of decoded section buffers
#[derive(Debug, Clone, Default)]
pub struct BufferCache {
    buffers: Arc<Mutex<CacheMap>>,
}

impl BufferCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheMap> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a cached buffer without loading
    pub fn get(&self, beat: &BeatId, section: Section) -> Option<Arc<DecodedBuffer>> {
        self.lock().get(&(beat.clone(), section)).cloned()
    }

    /// Insert a buffer; an existing entry is kept and returned instead
    pub fn insert(
        &self,
        beat: &BeatId,
        section: Section,
        buffer: DecodedBuffer,
    ) -> Arc<DecodedBuffer> {
        Arc::clone(
            self.lock()
                .entry((beat.clone(), section))
                .or_insert_with(|| Arc::new(buffer)),
        )
    }

    /// Check whether a section is cached
    pub fn contains(&self, beat: &BeatId, section: Section) -> bool {
        self.lock().contains_key(&(beat.clone(), section))
    }

    /// Get a buffer, fetching and decoding it on a miss.
    ///
    /// Failures are not cached; the next request tries again.
    pub async fn get_buffer(
        &self,
        source: &dyn SectionSource,
        beat: &BeatId,
        section: Section,
        locator: &str,
    ) -> Result<Arc<DecodedBuffer>, EngineError> {
        if let Some(buffer) = self.get(beat, section) {
            trace!(%beat, %section, "cache hit");
            return Ok(buffer);
        }

        debug!(%beat, %section, locator, "fetching section");
        let bytes = source
            .fetch(beat, locator)
            .await
            .map_err(|e| EngineError::FetchFailed {
                section,
                reason: e.to_string(),
            })?;

        let decoded = tokio::task::spawn_blocking(move || decode_wav(&bytes))
            .await
            .map_err(|e| EngineError::DecodeFailed {
                section,
                reason: e.to_string(),
            })?
            .map_err(|e| EngineError::DecodeFailed {
                section,
                reason: e.to_string(),
            })?;

        debug!(
            %beat,
            %section,
            frames = decoded.frames(),
            sample_rate = decoded.sample_rate(),
            "section decoded"
        );
        Ok(self.insert(beat, section, decoded))
    }

    /// Drop every buffer not belonging to `beat`
    pub fn evict_except(&self, beat: &BeatId) {
        let mut buffers = self.lock();
        let before = buffers.len();
        buffers.retain(|(b, _), _| b == beat);
        debug!(kept = buffers.len(), evicted = before - buffers.len(), "cache evicted");
    }

    /// Drop everything
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached buffers
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
