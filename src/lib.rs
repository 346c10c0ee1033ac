// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Arranger-style section player.
//!
//! Plays pre-rendered style sections (Intro, Main, Ending and Fill In,
//! variations A to D) the way an arranger keyboard does: a Main loops, a
//! one-shot plays once and hands back to a Main, and late results from
//! superseded requests never restart playback.
//!
//! ```no_run
//! use std::sync::Arc;
//! use styplay::{Beat, DirSource, EngineConfig, Letter, Player};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let mut player = Player::new(EngineConfig::default(), Arc::new(DirSource::new("styles")));
//! let _output = player.open_output()?;
//!
//! player.select_beat(Beat::new("42", 100.0));
//! player.settle().await;
//! player.toggle_play()?;
//! player.set_intro(Letter::B)?;
//! loop {
//!     if let Some(event) = player.next_event().await {
//!         player.handle_event(event);
//!     }
//! }
//! # }
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod player;
pub mod policy;
pub mod section;
pub mod session;

pub use cache::{BufferCache, DecodedBuffer};
pub use catalog::{Beat, BeatId, CatalogError, DirSource, HttpSource, MemorySource, SectionSource};
pub use config::EngineConfig;
pub use error::{EngineError, Severity};
pub use graph::{AudioOutput, GraphRenderer, PlaybackGraph};
pub use player::{Notice, Player, PlayerEvent, Status};
pub use policy::{PlayerState, Selection, TransitionPolicy};
pub use section::{AvailabilityTable, Letter, Section, SectionKind};
pub use session::{SessionAuthority, SessionToken};
