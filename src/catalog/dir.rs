// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Local directory catalog backend.
//!
//! Layout mirrors the server's storage bucket:
//!
//! ```text
//! root/
//!   42/
//!     Main_A.wav
//!     Intro_A.wav
//!     Fill_In_AA.wav
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{AvailabilityMap, BeatId, CatalogError, SectionSource, SourceFuture};

/// Section source reading rendered sections from disk
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Create a source rooted at a directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn io_error(path: &Path, err: std::io::Error) -> CatalogError {
    if err.kind() == ErrorKind::NotFound {
        CatalogError::NotFound(path.display().to_string())
    } else {
        CatalogError::Io(format!("{}: {}", path.display(), err))
    }
}

impl SectionSource for DirSource {
    fn availability<'a>(&'a self, beat: &'a BeatId) -> SourceFuture<'a, AvailabilityMap> {
        Box::pin(async move {
            let dir = self.root.join(beat.as_str());
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| io_error(&dir, e))?;

            let mut map = AvailabilityMap::new();
            while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&dir, e))? {
                let path = entry.path();
                // Locators always end in lowercase `.wav`
                let is_wav = path.extension().is_some_and(|ext| ext == "wav");
                if !is_wav {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    map.insert(stem.replace('_', " "), true);
                }
            }

            debug!(beat = %beat, sections = map.len(), "scanned beat directory");
            Ok(map)
        })
    }

    fn fetch<'a>(&'a self, _beat: &'a BeatId, locator: &'a str) -> SourceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let path = self.root.join(locator);
            tokio::fs::read(&path).await.map_err(|e| io_error(&path, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::section_locator;

    #[tokio::test]
    async fn test_availability_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let beat_dir = dir.path().join("7");
        std::fs::create_dir_all(&beat_dir).unwrap();
        std::fs::write(beat_dir.join("Main_A.wav"), b"x").unwrap();
        std::fs::write(beat_dir.join("Fill_In_AA.wav"), b"x").unwrap();
        std::fs::write(beat_dir.join("notes.txt"), b"x").unwrap();
        std::fs::write(beat_dir.join("Main_B.WAV"), b"x").unwrap();

        let source = DirSource::new(dir.path());
        let map = source.availability(&BeatId::new("7")).await.unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Main A"), Some(&true));
        assert_eq!(map.get("Fill In AA"), Some(&true));
        assert!(!map.contains_key("Main B"));
    }

    #[tokio::test]
    async fn test_fetch_by_locator() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("7")).unwrap();
        std::fs::write(dir.path().join("7").join("End_B.wav"), b"RIFF").unwrap();

        let source = DirSource::new(dir.path());
        let beat = BeatId::new("7");
        let bytes = source
            .fetch(&beat, &section_locator(&beat, "End B"))
            .await
            .unwrap();
        assert_eq!(bytes, b"RIFF");
    }

    #[tokio::test]
    async fn test_missing_beat_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        let result = source.availability(&BeatId::new("nope")).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }
}
