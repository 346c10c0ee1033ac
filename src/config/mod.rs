// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Engine configuration.
//!
//! Loaded from YAML; every field has a default so a partial file (or
//! none at all) yields a usable configuration.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::graph::{AudioConfig, MAX_RATE, MIN_RATE};

/// Root engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let playback = &self.playback;
        if !(playback.min_rate > 0.0 && playback.min_rate <= playback.max_rate) {
            bail!(
                "playback rate bounds invalid: min {} max {}",
                playback.min_rate,
                playback.max_rate
            );
        }
        if !(playback.default_tempo.is_finite() && playback.default_tempo > 0.0) {
            bail!("default tempo must be positive, got {}", playback.default_tempo);
        }
        if !(0.0..=100.0).contains(&playback.default_volume) {
            bail!("default volume must be 0-100, got {}", playback.default_volume);
        }
        if self.audio.sample_rate == 0 {
            bail!("audio sample rate must be non-zero");
        }
        if self.audio.channels == 0 {
            bail!("audio channel count must be non-zero");
        }
        Ok(())
    }
}

/// Tempo, rate and volume settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Base tempo for beats that report none
    #[serde(default = "default_tempo")]
    pub default_tempo: f64,
    /// Lowest playback rate
    #[serde(default = "default_min_rate")]
    pub min_rate: f64,
    /// Highest playback rate
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,
    /// Initial volume percentage
    #[serde(default = "default_volume")]
    pub default_volume: f64,
}

fn default_tempo() -> f64 {
    120.0
}
fn default_min_rate() -> f64 {
    MIN_RATE
}
fn default_max_rate() -> f64 {
    MAX_RATE
}
fn default_volume() -> f64 {
    100.0
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_tempo: default_tempo(),
            min_rate: default_min_rate(),
            max_rate: default_max_rate(),
            default_volume: default_volume(),
        }
    }
}

/// Section change behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransitionConfig {
    /// Play `Fill In XX` before switching to Main X
    #[serde(default)]
    pub autofill: bool,
}

/// Buffer cache behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Drop other beats' buffers when a beat is selected
    #[serde(default)]
    pub evict_on_beat_change: bool,
}

/// Beat server connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    /// Server base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Bearer token sent with every request
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            auth_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
playback:
  default_tempo: 96
  min_rate: 0.5
  max_rate: 2.0
  default_volume: 80
transition:
  autofill: true
cache:
  evict_on_beat_change: true
catalog:
  base_url: "https://beats.example.com"
  timeout_ms: 2500
  auth_token: "secret"
audio:
  sample_rate: 48000
  buffer_size: 256
  channels: 2
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.playback.default_tempo, 96.0);
        assert_eq!(config.playback.max_rate, 2.0);
        assert!(config.transition.autofill);
        assert!(config.cache.evict_on_beat_change);
        assert_eq!(config.catalog.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.audio.sample_rate, 48000);
    }

    #[test]
    fn test_defaults_from_partial_yaml() {
        let config = EngineConfig::from_yaml("transition:\n  autofill: true\n").unwrap();
        assert!(config.transition.autofill);
        assert_eq!(config.playback, PlaybackConfig::default());
        assert_eq!(config.catalog.base_url, "http://localhost:5000");
        assert_eq!(config.audio.buffer_size, 512);
        assert!(!config.cache.evict_on_beat_change);
    }

    #[test]
    fn test_validation_errors() {
        assert!(EngineConfig::from_yaml("playback:\n  min_rate: 3.0\n  max_rate: 1.0\n").is_err());
        assert!(EngineConfig::from_yaml("playback:\n  default_volume: 140\n").is_err());
        assert!(EngineConfig::from_yaml("audio:\n  sample_rate: 0\n").is_err());
        assert!(EngineConfig::from_yaml("this is not valid yaml: [").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.yaml");

        let mut config = EngineConfig::default();
        config.playback.default_tempo = 88.0;
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(EngineConfig::load(dir.path().join("missing.yaml")).is_err());
    }
}
