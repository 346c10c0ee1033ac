// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! In-memory catalog backend.
//!
//! Useful for embedding pre-rendered sections and for exercising the
//! player without a server. Fetches can be made to fail or to take time.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{
    section_locator, AvailabilityMap, BeatId, CatalogError, SectionSource, SourceFuture,
};

#[derive(Debug, Default)]
struct Inner {
    /// Beat -> section name -> bytes
    sections: HashMap<BeatId, HashMap<String, Vec<u8>>>,
    /// Names reported as absent (present in the map with `false`)
    absent: HashMap<BeatId, HashSet<String>>,
    /// Locators whose fetch fails
    failing: HashSet<String>,
    /// Beats whose availability request fails
    unreachable: HashSet<BeatId>,
}

/// Section source holding section bytes in memory
#[derive(Debug, Default)]
pub struct MemorySource {
    inner: Mutex<Inner>,
    latency: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a section's bytes under the given catalog name
    pub fn insert(&self, beat: impl Into<BeatId>, name: &str, bytes: Vec<u8>) {
        self.inner()
            .sections
            .entry(beat.into())
            .or_default()
            .insert(name.to_string(), bytes);
    }

    /// Builder: add a section
    pub fn with_section(self, beat: impl Into<BeatId>, name: &str, bytes: Vec<u8>) -> Self {
        self.insert(beat, name, bytes);
        self
    }

    /// Report a section name as explicitly absent
    pub fn mark_absent(&self, beat: impl Into<BeatId>, name: &str) {
        self.inner()
            .absent
            .entry(beat.into())
            .or_default()
            .insert(name.to_string());
    }

    /// Make fetches of a section fail
    pub fn fail_fetch(&self, beat: impl Into<BeatId>, name: &str) {
        let locator = section_locator(&beat.into(), name);
        self.inner().failing.insert(locator);
    }

    /// Make availability requests for a beat fail
    pub fn fail_availability(&self, beat: impl Into<BeatId>) {
        self.inner().unreachable.insert(beat.into());
    }

    /// Delay every request by a fixed duration
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap_or_else(PoisonError::into_inner) = latency;
    }

    /// Number of fetches served (including failed ones)
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        let latency = *self.latency.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn lookup(&self, beat: &BeatId, locator: &str) -> Result<Vec<u8>, CatalogError> {
        let inner = self.inner();
        if inner.failing.contains(locator) {
            return Err(CatalogError::Status(500));
        }
        inner
            .sections
            .get(beat)
            .and_then(|sections| {
                sections
                    .iter()
                    .find(|(name, _)| section_locator(beat, name) == locator)
                    .map(|(_, bytes)| bytes.clone())
            })
            .ok_or_else(|| CatalogError::NotFound(locator.to_string()))
    }
}

impl SectionSource for MemorySource {
    fn availability<'a>(&'a self, beat: &'a BeatId) -> SourceFuture<'a, AvailabilityMap> {
        Box::pin(async move {
            self.delay().await;
            let inner = self.inner();
            if inner.unreachable.contains(beat) {
                return Err(CatalogError::Status(503));
            }

            let mut map = AvailabilityMap::new();
            if let Some(absent) = inner.absent.get(beat) {
                map.extend(absent.iter().map(|name| (name.clone(), false)));
            }
            if let Some(sections) = inner.sections.get(beat) {
                map.extend(sections.keys().map(|name| (name.clone(), true)));
            }

            if map.is_empty() {
                return Err(CatalogError::NotFound(beat.to_string()));
            }
            Ok(map)
        })
    }

    fn fetch<'a>(&'a self, beat: &'a BeatId, locator: &'a str) -> SourceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            self.delay().await;
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.lookup(beat, locator)
        })
    }
}
