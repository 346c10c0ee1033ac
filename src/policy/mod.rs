// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transition policy.
//!
//! Decides what plays next from the current state, the user's armed
//! selection and the beat's availability table. The policy never touches
//! audio; it returns an [`Action`] that the player carries out.
//!
//! | From | Event | To |
//! |------|-------|----|
//! | Stopped | play | `LoopPlaying(main)`, or `OneShotPlaying(Intro X, main)` if an intro is armed |
//! | LoopPlaying(L) | choose Main M | `LoopPlaying(M)` (or the `Fill In MM` one-shot with autofill) |
//! | LoopPlaying(L) | choose Intro/Ending S | `OneShotPlaying(S, L)` |
//! | OneShotPlaying(S, L) | one-shot ends | `LoopPlaying(L)` |
//! | any playing | play | `Stopped` |

use std::fmt;

use crate::error::{EngineError, Result};
use crate::section::{AvailabilityTable, Letter, Section, SectionKind};

/// Playback state as seen by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// No beat selected
    Idle,
    /// Beat selected, nothing playing
    Stopped,
    /// A Main section is looping
    LoopPlaying(Letter),
    /// A one-shot is playing; the loop resumes on `resume` when it ends
    OneShotPlaying { section: Section, resume: Letter },
}

impl PlayerState {
    pub fn is_playing(&self) -> bool {
        matches!(
            self,
            PlayerState::LoopPlaying(_) | PlayerState::OneShotPlaying { .. }
        )
    }

    /// Section currently playing (or being loaded to play)
    pub fn active_section(&self) -> Option<Section> {
        match self {
            PlayerState::LoopPlaying(letter) => Some(Section::main(*letter)),
            PlayerState::OneShotPlaying { section, .. } => Some(*section),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerState::Idle => write!(f, "Idle"),
            PlayerState::Stopped => write!(f, "Stopped"),
            PlayerState::LoopPlaying(letter) => write!(f, "LoopPlaying(Main {})", letter),
            PlayerState::OneShotPlaying { section, resume } => {
                write!(f, "OneShotPlaying({}, resume Main {})", section, resume)
            }
        }
    }
}

/// Sections the user has armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Main section to loop
    pub main: Letter,
    /// Intro to play before the main on the next start
    pub intro: Option<Letter>,
    /// Armed ending
    pub ending: Option<Letter>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            main: Letter::A,
            intro: None,
            ending: None,
        }
    }
}

impl Selection {
    /// Disarm the intro or ending matching a finished one-shot
    fn consume(&mut self, section: Section) {
        match section.kind() {
            SectionKind::Intro if self.intro == Some(section.letter()) => self.intro = None,
            SectionKind::Ending if self.ending == Some(section.letter()) => self.ending = None,
            _ => {}
        }
    }

    /// Arm an intro or ending; the two are mutually exclusive
    fn arm(&mut self, section: Section) {
        match section.kind() {
            SectionKind::Intro => {
                self.intro = Some(section.letter());
                self.ending = None;
            }
            SectionKind::Ending => {
                self.ending = Some(section.letter());
                self.intro = None;
            }
            _ => {}
        }
    }

    fn is_armed(&self, section: Section) -> bool {
        match section.kind() {
            SectionKind::Intro => self.intro == Some(section.letter()),
            SectionKind::Ending => self.ending == Some(section.letter()),
            _ => false,
        }
    }
}

/// What to start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayTarget {
    /// Loop a Main section
    Loop(Letter),
    /// Play a one-shot, then loop `resume`
    OneShot { section: Section, resume: Letter },
}

impl PlayTarget {
    /// Section whose buffer is needed
    pub fn section(&self) -> Section {
        match self {
            PlayTarget::Loop(letter) => Section::main(*letter),
            PlayTarget::OneShot { section, .. } => *section,
        }
    }

    /// State once this target is playing
    pub fn state(&self) -> PlayerState {
        match *self {
            PlayTarget::Loop(letter) => PlayerState::LoopPlaying(letter),
            PlayTarget::OneShot { section, resume } => PlayerState::OneShotPlaying { section, resume },
        }
    }
}

/// Decision returned by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Selection changed at most
    Nothing,
    /// Start a new session playing the target
    Start(PlayTarget),
    /// Stop all playback
    Stop,
    /// Keep the running one-shot, resume a different Main afterwards
    Retarget(Letter),
}

/// Transition rules
#[derive(Debug, Clone, Default)]
pub struct TransitionPolicy {
    autofill: bool,
}

impl TransitionPolicy {
    pub fn new(autofill: bool) -> Self {
        Self { autofill }
    }

    pub fn autofill(&self) -> bool {
        self.autofill
    }

    pub fn set_autofill(&mut self, autofill: bool) {
        self.autofill = autofill;
    }

    /// Main to start: the selected one if present, else the first of A to D
    fn playable_main(selection: &Selection, table: &AvailabilityTable) -> Result<Letter> {
        if table.is_available(Section::main(selection.main)) {
            return Ok(selection.main);
        }
        table.first_available_main().ok_or(EngineError::NoPlayableMain)
    }

    /// Play/stop button
    pub fn on_press_play(
        &self,
        state: &PlayerState,
        selection: &mut Selection,
        table: &AvailabilityTable,
    ) -> Result<Action> {
        match state {
            PlayerState::Idle => Err(EngineError::NoBeatSelected),
            PlayerState::Stopped => {
                let main = Self::playable_main(selection, table)?;
                selection.main = main;

                let intro = selection
                    .intro
                    .map(Section::intro)
                    .filter(|intro| table.is_available(*intro));
                Ok(Action::Start(match intro {
                    Some(section) => PlayTarget::OneShot {
                        section,
                        resume: main,
                    },
                    None => PlayTarget::Loop(main),
                }))
            }
            _ => Ok(Action::Stop),
        }
    }

    /// A section control was chosen
    pub fn on_choose(
        &self,
        state: &PlayerState,
        selection: &mut Selection,
        section: Section,
        table: &AvailabilityTable,
    ) -> Result<Action> {
        if *state == PlayerState::Idle {
            return Err(EngineError::NoBeatSelected);
        }
        if !table.is_available(section) {
            return Err(EngineError::SectionUnavailable(section));
        }

        let letter = section.letter();
        match section.kind() {
            SectionKind::Main => {
                selection.main = letter;
                match state {
                    PlayerState::LoopPlaying(current) => {
                        let fill = Section::fill(letter);
                        if self.autofill && table.is_available(fill) {
                            Ok(Action::Start(PlayTarget::OneShot {
                                section: fill,
                                resume: letter,
                            }))
                        } else if *current != letter {
                            Ok(Action::Start(PlayTarget::Loop(letter)))
                        } else {
                            Ok(Action::Nothing)
                        }
                    }
                    PlayerState::OneShotPlaying { .. } => Ok(Action::Retarget(letter)),
                    _ => Ok(Action::Nothing),
                }
            }
            SectionKind::Intro | SectionKind::Ending => match state {
                PlayerState::Stopped => {
                    if selection.is_armed(section) {
                        selection.consume(section);
                    } else {
                        selection.arm(section);
                    }
                    Ok(Action::Nothing)
                }
                PlayerState::LoopPlaying(resume) | PlayerState::OneShotPlaying { resume, .. } => {
                    selection.arm(section);
                    Ok(Action::Start(PlayTarget::OneShot {
                        section,
                        resume: *resume,
                    }))
                }
                PlayerState::Idle => Ok(Action::Nothing),
            },
            SectionKind::Fill => {
                if !state.is_playing() {
                    return Ok(Action::Nothing);
                }
                selection.main = letter;
                Ok(Action::Start(PlayTarget::OneShot {
                    section,
                    resume: letter,
                }))
            }
        }
    }

    /// The current session's one-shot played to its end
    pub fn on_one_shot_complete(&self, state: &PlayerState, selection: &mut Selection) -> Action {
        match state {
            PlayerState::OneShotPlaying { section, resume } => {
                selection.consume(*section);
                Action::Start(PlayTarget::Loop(*resume))
            }
            _ => Action::Nothing,
        }
    }
}
