// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! HTTP catalog backend.
//!
//! Talks to the beat server: availability comes from
//! `GET {base}/api/player/sections/{beat}` as a `{ name: bool|0|1 }`
//! object, section audio from `GET {base}/api/player/audio/{locator}`.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{
    presence_map, AvailabilityMap, Beat, BeatId, CatalogError, Presence, SectionSource,
    SourceFuture,
};
use crate::config::CatalogConfig;

const BEATS_PATH: &str = "/api/beats/public";
const SECTIONS_PATH: &str = "/api/player/sections";
const AUDIO_PATH: &str = "/api/player/audio";

/// Section source backed by the beat server's HTTP API
pub struct HttpSource {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpSource {
    /// Create a source from catalog configuration
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CatalogError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn beats_url(&self) -> String {
        format!("{}{}", self.base_url, BEATS_PATH)
    }

    fn sections_url(&self, beat: &BeatId) -> String {
        format!("{}{}/{}", self.base_url, SECTIONS_PATH, beat)
    }

    fn audio_url(&self, locator: &str) -> String {
        format!("{}{}/{}", self.base_url, AUDIO_PATH, locator)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, url: String) -> Result<Response, CatalogError> {
        debug!(%url, "catalog request");
        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound(url)),
            status if !status.is_success() => Err(CatalogError::Status(status.as_u16())),
            _ => Ok(response),
        }
    }

    /// List public beats, sorted by title
    pub async fn list_beats(&self) -> Result<Vec<Beat>, CatalogError> {
        let response = self.send(self.beats_url()).await?;
        let listing: BeatListing = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        Ok(listing.into_beats())
    }
}

impl SectionSource for HttpSource {
    fn availability<'a>(&'a self, beat: &'a BeatId) -> SourceFuture<'a, AvailabilityMap> {
        Box::pin(async move {
            let response = self.send(self.sections_url(beat)).await?;
            let raw: HashMap<String, Presence> = response
                .json()
                .await
                .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
            Ok(presence_map(raw))
        })
    }

    fn fetch<'a>(&'a self, _beat: &'a BeatId, locator: &'a str) -> SourceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let response = self.send(self.audio_url(locator)).await?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| CatalogError::Request(e.to_string()))?;
            Ok(bytes.to_vec())
        })
    }
}

/// `GET /api/beats/public` response body
#[derive(Debug, Deserialize)]
struct BeatListing {
    beats: Vec<BeatEntry>,
}

#[derive(Debug, Deserialize)]
struct BeatEntry {
    id: WireValue,
    #[serde(default)]
    title: String,
    #[serde(default)]
    tempo: Option<WireValue>,
}

/// Ids and tempos arrive either as numbers or strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireValue {
    Number(f64),
    Text(String),
}

impl WireValue {
    fn as_id(&self) -> String {
        match self {
            WireValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            WireValue::Number(n) => n.to_string(),
            WireValue::Text(s) => s.clone(),
        }
    }

    fn as_tempo(&self) -> Option<f64> {
        let tempo = match self {
            WireValue::Number(n) => *n,
            WireValue::Text(s) => s.trim().parse().ok()?,
        };
        (tempo.is_finite() && tempo > 0.0).then_some(tempo)
    }
}

impl BeatListing {
    fn into_beats(self) -> Vec<Beat> {
        let mut beats: Vec<Beat> = self
            .beats
            .into_iter()
            .map(|entry| Beat {
                id: BeatId::new(entry.id.as_id()),
                title: entry.title,
                tempo: entry.tempo.as_ref().and_then(WireValue::as_tempo),
            })
            .collect();
        beats.sort_by_key(|beat| beat.title.to_lowercase());
        beats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base_url: &str) -> HttpSource {
        let config = CatalogConfig {
            base_url: base_url.to_string(),
            ..CatalogConfig::default()
        };
        HttpSource::new(&config).unwrap()
    }

    #[test]
    fn test_urls() {
        let source = source("http://beats.local:5000/");
        assert_eq!(source.base_url(), "http://beats.local:5000");
        assert_eq!(
            source.sections_url(&BeatId::new("12")),
            "http://beats.local:5000/api/player/sections/12"
        );
        assert_eq!(
            source.audio_url("12/Main_A.wav"),
            "http://beats.local:5000/api/player/audio/12/Main_A.wav"
        );
        assert_eq!(source.beats_url(), "http://beats.local:5000/api/beats/public");
    }

    #[test]
    fn test_beat_listing_conversion() {
        let listing = BeatListing {
            beats: vec![
                BeatEntry {
                    id: WireValue::Number(3.0),
                    title: "zouk".into(),
                    tempo: Some(WireValue::Text("140".into())),
                },
                BeatEntry {
                    id: WireValue::Text("a1".into()),
                    title: "Bossa".into(),
                    tempo: Some(WireValue::Number(96.0)),
                },
                BeatEntry {
                    id: WireValue::Number(9.0),
                    title: "March".into(),
                    tempo: Some(WireValue::Text("fast".into())),
                },
            ],
        };

        let beats = listing.into_beats();
        let titles: Vec<&str> = beats.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Bossa", "March", "zouk"]);
        assert_eq!(beats[0].id.as_str(), "a1");
        assert_eq!(beats[0].tempo, Some(96.0));
        assert_eq!(beats[1].tempo, None);
        assert_eq!(beats[2].id.as_str(), "3");
        assert_eq!(beats[2].tempo, Some(140.0));
    }
}
