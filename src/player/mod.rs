// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Player control surface.
//!
//! The [`Player`] owns every piece of playback state. Commands run
//! synchronously on `&mut self`; fetches, decodes and availability
//! lookups run as tokio tasks and come back as [`PlayerEvent`]s, which the
//! host feeds to [`Player::handle_event`] (or lets [`Player::settle`]
//! drain). Every result carries the session token it was started under
//! and is dropped if that token is no longer current.
//!
//! Commands that spawn work must be called from within a tokio runtime.

mod status;

pub use status::{Notice, Status};

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn};

use crate::cache::{BufferCache, DecodedBuffer};
use crate::catalog::{
    section_locator, AvailabilityMap, Beat, BeatId, CatalogError, HttpSource, SectionSource,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result, Severity};
use crate::graph::{
    gain_from_percent, playback_rate, AudioError, AudioOutput, GraphEvent, GraphRenderer,
    PlaybackGraph,
};
use crate::policy::{Action, PlayTarget, PlayerState, Selection, TransitionPolicy};
use crate::section::{AvailabilityTable, Letter, Section, SectionKind};
use crate::session::{SessionAuthority, SessionToken};

/// Completion of work started by the player
#[derive(Debug)]
pub enum PlayerEvent {
    /// Availability lookup for a selected beat finished
    AvailabilityResolved {
        token: SessionToken,
        beat: BeatId,
        result: std::result::Result<AvailabilityMap, CatalogError>,
    },
    /// Buffer needed to start playback is ready (or failed)
    BufferLoaded {
        token: SessionToken,
        beat: BeatId,
        section: Section,
        result: Result<Arc<DecodedBuffer>>,
    },
    /// Background prefetch finished
    Prefetched {
        beat: BeatId,
        section: Section,
        result: Result<()>,
    },
    /// Event from the playback graph
    Graph(GraphEvent),
}

/// A start waiting for its buffer
#[derive(Debug, Clone, Copy)]
struct Pending {
    token: SessionToken,
    target: PlayTarget,
}

/// Arranger-style section player
pub struct Player {
    config: EngineConfig,
    source: Arc<dyn SectionSource>,
    cache: BufferCache,
    /// Playback sessions
    sessions: SessionAuthority,
    /// Beat selections; availability results are matched against these
    beats: SessionAuthority,
    graph: PlaybackGraph,
    policy: TransitionPolicy,
    state: PlayerState,
    selection: Selection,
    beat: Option<Beat>,
    table: AvailabilityTable,
    resolving: bool,
    play_when_resolved: bool,
    pending: Option<Pending>,
    /// Spawned tasks that have not reported back yet
    in_flight: usize,
    tempo: f64,
    volume: f64,
    notices: Vec<Notice>,
    events_tx: UnboundedSender<PlayerEvent>,
    events_rx: UnboundedReceiver<PlayerEvent>,
}

impl Player {
    /// Create a player reading sections from `source`
    pub fn new(config: EngineConfig, source: Arc<dyn SectionSource>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let graph_tx = events_tx.clone();
        let sink = move |event: GraphEvent| {
            // Receiver lives as long as the player; a failed send means it is gone
            let _ = graph_tx.send(PlayerEvent::Graph(event));
        };
        let graph = PlaybackGraph::new(config.audio.sample_rate).with_sink(Box::new(sink));
        graph.set_gain(gain_from_percent(config.playback.default_volume));

        Self {
            policy: TransitionPolicy::new(config.transition.autofill),
            tempo: config.playback.default_tempo,
            volume: config.playback.default_volume,
            config,
            source,
            cache: BufferCache::new(),
            sessions: SessionAuthority::new(),
            beats: SessionAuthority::new(),
            graph,
            state: PlayerState::Idle,
            selection: Selection::default(),
            beat: None,
            table: AvailabilityTable::new(),
            resolving: false,
            play_when_resolved: false,
            pending: None,
            in_flight: 0,
            notices: Vec::new(),
            events_tx,
            events_rx,
        }
    }

    /// Create a player talking to the beat server named in `config.catalog`
    pub fn with_http(config: EngineConfig) -> std::result::Result<Self, CatalogError> {
        let source = HttpSource::new(&config.catalog)?;
        Ok(Self::new(config, Arc::new(source)))
    }

    /// Builder: use an existing buffer cache (shared between players)
    pub fn with_cache(mut self, cache: BufferCache) -> Self {
        self.cache = cache;
        self
    }

    // ---- Queries ----

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get selected beat
    pub fn beat(&self) -> Option<&Beat> {
        self.beat.as_ref()
    }

    /// Get current beat's availability
    pub fn availability(&self) -> &AvailabilityTable {
        &self.table
    }

    /// Get armed selection
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Get buffer cache
    pub fn cache(&self) -> &BufferCache {
        &self.cache
    }

    pub fn autofill(&self) -> bool {
        self.policy.autofill()
    }

    /// Whether the control for a section can be used
    pub fn control_enabled(&self, kind: SectionKind, letter: Letter) -> bool {
        self.beat.is_some() && !self.resolving && self.table.is_available(Section::new(kind, letter))
    }

    /// Snapshot of what the player is doing
    pub fn status(&self) -> Status {
        Status {
            state: self.state,
            is_playing: self.state.is_playing(),
            active_section: self.state.active_section(),
            is_loading: self.pending.is_some() || self.resolving,
            tempo: self.tempo,
            volume: self.volume,
            rate: self.graph.rate(),
            gain: self.graph.gain(),
            audible_lines: self.graph.audible_lines(),
        }
    }

    /// Take notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Render handle for a custom audio sink
    pub fn renderer(&self) -> GraphRenderer {
        self.graph.renderer()
    }

    /// Open the default audio device and start rendering into it
    pub fn open_output(&self) -> std::result::Result<AudioOutput, AudioError> {
        AudioOutput::new(self.config.audio.clone(), self.graph.renderer())
    }

    // ---- Commands ----

    /// Select a beat: stop playback, reset the selection and resolve its sections
    pub fn select_beat(&mut self, beat: Beat) {
        self.halt();
        if self.config.cache.evict_on_beat_change {
            self.cache.evict_except(&beat.id);
        }

        info!(beat = %beat.id, title = %beat.title, "beat selected");
        self.selection = Selection::default();
        self.table = AvailabilityTable::new();
        self.state = PlayerState::Stopped;
        self.tempo = beat.tempo.unwrap_or(self.config.playback.default_tempo);
        let id = beat.id.clone();
        self.beat = Some(beat);
        self.graph.set_rate(self.rate());

        let token = self.beats.new_session();
        self.resolving = true;
        self.play_when_resolved = false;
        self.spawn_availability(token, id);
    }

    /// Drop the selected beat and return to idle
    pub fn close_beat(&mut self) {
        self.halt();
        self.beats.new_session();
        self.resolving = false;
        self.play_when_resolved = false;
        self.beat = None;
        self.table = AvailabilityTable::new();
        self.selection = Selection::default();
        self.state = PlayerState::Idle;
        debug!("beat closed");
    }

    /// Choose a section control
    pub fn choose(&mut self, kind: SectionKind, letter: Letter) -> Result<()> {
        let section = Section::new(kind, letter);
        let action = self
            .policy
            .on_choose(&self.state, &mut self.selection, section, &self.table);
        match action {
            Ok(action) => {
                debug!(%section, ?action, "section chosen");
                self.perform(action);
                Ok(())
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    pub fn set_main(&mut self, letter: Letter) -> Result<()> {
        self.choose(SectionKind::Main, letter)
    }

    pub fn set_intro(&mut self, letter: Letter) -> Result<()> {
        self.choose(SectionKind::Intro, letter)
    }

    pub fn set_ending(&mut self, letter: Letter) -> Result<()> {
        self.choose(SectionKind::Ending, letter)
    }

    /// Play/stop button
    pub fn toggle_play(&mut self) -> Result<()> {
        if self.state == PlayerState::Idle {
            return Err(self.reject(EngineError::NoBeatSelected));
        }
        if self.resolving {
            self.play_when_resolved = !self.play_when_resolved;
            debug!(deferred = self.play_when_resolved, "play toggled while resolving");
            return Ok(());
        }

        match self
            .policy
            .on_press_play(&self.state, &mut self.selection, &self.table)
        {
            Ok(action) => {
                self.perform(action);
                Ok(())
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Stop playback; calling it again changes nothing
    pub fn stop(&mut self) {
        self.play_when_resolved = false;
        if !self.state.is_playing() && self.pending.is_none() {
            self.graph.stop_all();
            return;
        }
        self.halt();
        self.state = PlayerState::Stopped;
        info!("playback stopped");
    }

    /// Set tempo in BPM; the playback rate follows, clamped to the rate bounds
    pub fn set_tempo(&mut self, bpm: f64) -> Result<()> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(self.reject(EngineError::InvalidTempo(bpm)));
        }
        self.tempo = bpm;
        let rate = self.rate();
        self.graph.set_rate(rate);
        trace!(bpm, rate, "tempo changed");
        Ok(())
    }

    /// Set volume in percent (0-100)
    pub fn set_volume(&mut self, percent: f64) -> Result<()> {
        if !percent.is_finite() {
            return Err(self.reject(EngineError::InvalidVolume(percent)));
        }
        self.volume = percent.clamp(0.0, 100.0);
        self.graph.set_gain(gain_from_percent(self.volume));
        Ok(())
    }

    /// Switch between direct main changes and fill-first changes
    pub fn set_autofill(&mut self, autofill: bool) {
        self.policy.set_autofill(autofill);
    }

    // ---- Event loop ----

    /// Wait for the next completion
    pub async fn next_event(&mut self) -> Option<PlayerEvent> {
        self.events_rx.recv().await
    }

    /// Apply a completion
    pub fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::AvailabilityResolved {
                token,
                beat,
                result,
            } => {
                self.task_done();
                self.on_availability(token, beat, result);
            }
            PlayerEvent::BufferLoaded {
                token,
                beat,
                section,
                result,
            } => {
                self.task_done();
                self.drop_foreign_buffers(&beat);
                self.on_buffer_loaded(token, section, result);
            }
            PlayerEvent::Prefetched {
                beat,
                section,
                result,
            } => {
                self.task_done();
                self.drop_foreign_buffers(&beat);
                if let Err(e) = result {
                    debug!(%section, error = %e, "prefetch failed");
                }
            }
            PlayerEvent::Graph(GraphEvent::OneShotEnded(token)) => self.on_one_shot_ended(token),
        }
    }

    /// Process events until no spawned work is outstanding
    pub async fn settle(&mut self) {
        loop {
            while let Ok(event) = self.events_rx.try_recv() {
                self.handle_event(event);
            }
            if self.in_flight == 0 {
                break;
            }
            match self.events_rx.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    // ---- Internals ----

    fn base_tempo(&self) -> f64 {
        self.beat
            .as_ref()
            .and_then(|beat| beat.tempo)
            .unwrap_or(self.config.playback.default_tempo)
    }

    fn rate(&self) -> f64 {
        let playback = &self.config.playback;
        playback_rate(self.tempo, self.base_tempo(), playback.min_rate, playback.max_rate)
    }

    fn gain(&self) -> f32 {
        gain_from_percent(self.volume)
    }

    fn notify(&mut self, error: EngineError) {
        let notice = Notice::new(error);
        match notice.severity {
            Severity::Info => debug!(error = %notice.error, "notice"),
            _ => warn!(error = %notice.error, "notice"),
        }
        self.notices.push(notice);
    }

    /// Record a rejected command and hand the error back
    fn reject(&mut self, error: EngineError) -> EngineError {
        self.notify(error.clone());
        error
    }

    fn task_done(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Invalidate the session and silence the graph
    fn halt(&mut self) {
        self.sessions.new_session();
        self.pending = None;
        self.graph.stop_all();
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::Nothing => {}
            Action::Start(target) => self.start(target),
            Action::Stop => self.stop(),
            Action::Retarget(letter) => self.retarget(letter),
        }
    }

    fn start(&mut self, target: PlayTarget) {
        let Some(beat) = self.beat.as_ref().map(|beat| beat.id.clone()) else {
            return;
        };
        let token = self.sessions.new_session();
        self.state = target.state();
        let section = target.section();

        match self.cache.get(&beat, section) {
            Some(buffer) => {
                self.pending = None;
                self.apply(token, target, buffer);
            }
            None => {
                debug!(%section, %token, "waiting for buffer");
                self.pending = Some(Pending { token, target });
                self.spawn_load(token, beat, section);
            }
        }
    }

    /// Switch the graph to a loaded target
    fn apply(&mut self, token: SessionToken, target: PlayTarget, buffer: Arc<DecodedBuffer>) {
        let rate = self.rate();
        let gain = self.gain();
        match target {
            PlayTarget::Loop(_) => self.graph.start_loop(buffer, rate, gain),
            PlayTarget::OneShot { resume, .. } => {
                self.graph.start_one_shot(buffer, rate, gain, token);
                self.prefetch(Section::main(resume));
            }
        }
        info!(state = %self.state, %token, "playing");
    }

    fn retarget(&mut self, letter: Letter) {
        if let PlayerState::OneShotPlaying { resume, .. } = &mut self.state {
            *resume = letter;
        }
        if let Some(Pending {
            target: PlayTarget::OneShot { resume, .. },
            ..
        }) = &mut self.pending
        {
            *resume = letter;
        }
        debug!(%letter, "resume main changed");
        self.prefetch(Section::main(letter));
    }

    fn locator(&self, beat: &BeatId, section: Section) -> String {
        let name = self
            .table
            .catalog_name(section)
            .map(str::to_string)
            .unwrap_or_else(|| section.to_string());
        section_locator(beat, &name)
    }

    fn spawn_availability(&mut self, token: SessionToken, beat: BeatId) {
        let source = Arc::clone(&self.source);
        let tx = self.events_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = source.availability(&beat).await;
            let _ = tx.send(PlayerEvent::AvailabilityResolved {
                token,
                beat,
                result,
            });
        });
    }

    fn spawn_load(&mut self, token: SessionToken, beat: BeatId, section: Section) {
        let locator = self.locator(&beat, section);
        let source = Arc::clone(&self.source);
        let cache = self.cache.clone();
        let tx = self.events_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = cache
                .get_buffer(source.as_ref(), &beat, section, &locator)
                .await;
            let _ = tx.send(PlayerEvent::BufferLoaded {
                token,
                beat,
                section,
                result,
            });
        });
    }

    /// Warm the cache for a section likely to be needed next
    fn prefetch(&mut self, section: Section) {
        let Some(beat) = self.beat.as_ref().map(|beat| beat.id.clone()) else {
            return;
        };
        if self.cache.contains(&beat, section) || !self.table.is_available(section) {
            return;
        }

        let locator = self.locator(&beat, section);
        let source = Arc::clone(&self.source);
        let cache = self.cache.clone();
        let tx = self.events_tx.clone();
        self.in_flight += 1;
        trace!(%section, "prefetching");
        tokio::spawn(async move {
            let result = cache
                .get_buffer(source.as_ref(), &beat, section, &locator)
                .await
                .map(|_| ());
            let _ = tx.send(PlayerEvent::Prefetched {
                beat,
                section,
                result,
            });
        });
    }

    fn on_availability(
        &mut self,
        token: SessionToken,
        beat: BeatId,
        result: std::result::Result<AvailabilityMap, CatalogError>,
    ) {
        if !self.beats.is_current(token) {
            trace!(%beat, "discarding availability for a previous beat");
            return;
        }
        self.resolving = false;

        match result {
            Ok(map) => {
                self.table = AvailabilityTable::from_map(&map);
                info!(%beat, sections = self.table.len(), "sections resolved");
                if std::mem::take(&mut self.play_when_resolved) {
                    // Rejections are already recorded as notices
                    let _ = self.toggle_play();
                }
            }
            Err(e) => {
                self.play_when_resolved = false;
                self.table = AvailabilityTable::new();
                self.notify(EngineError::AvailabilityFailed(e.to_string()));
            }
        }
    }

    /// A load for a beat that is no longer selected may have refilled the
    /// cache after `select_beat` evicted it
    fn drop_foreign_buffers(&self, loaded: &BeatId) {
        if !self.config.cache.evict_on_beat_change {
            return;
        }
        if let Some(current) = self.beat.as_ref().map(|beat| &beat.id) {
            if current != loaded {
                trace!(beat = %loaded, "evicting buffers loaded for a previous beat");
                self.cache.evict_except(current);
            }
        }
    }

    fn on_buffer_loaded(
        &mut self,
        token: SessionToken,
        section: Section,
        result: Result<Arc<DecodedBuffer>>,
    ) {
        let pending = match self.pending {
            Some(pending) if pending.token == token && self.sessions.is_current(token) => pending,
            _ => {
                trace!(%section, %token, "discarding stale load");
                return;
            }
        };
        self.pending = None;

        match result {
            Ok(buffer) => self.apply(token, pending.target, buffer),
            Err(e) => {
                self.halt();
                self.state = PlayerState::Stopped;
                self.notify(e);
            }
        }
    }

    fn on_one_shot_ended(&mut self, token: SessionToken) {
        if !self.sessions.is_current(token) {
            trace!(%token, "discarding stale one-shot end");
            return;
        }
        let action = self
            .policy
            .on_one_shot_complete(&self.state, &mut self.selection);
        debug!(?action, "one-shot finished");
        self.perform(action);
    }
}
