// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Arranger style sections.
//!
//! This module provides:
//! - Typed section names (Intro, Main, Ending, Fill In × A–D)
//! - Parsing of the catalog's section name strings
//! - Per-beat availability tables

pub mod availability;

pub use availability::AvailabilityTable;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Section variation letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    /// All letters in fallback order
    pub const ALL: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

    /// Parse a single letter (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            _ => None,
        }
    }

    /// Get the letter as a char
    pub fn as_char(self) -> char {
        match self {
            Letter::A => 'A',
            Letter::B => 'B',
            Letter::C => 'C',
            Letter::D => 'D',
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Kind of section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    /// Plays once before a Main
    Intro,
    /// Loops indefinitely
    Main,
    /// Plays once
    Ending,
    /// Transitional one-shot leading into the Main of the same letter
    Fill,
}

impl SectionKind {
    /// All kinds
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Intro,
        SectionKind::Main,
        SectionKind::Ending,
        SectionKind::Fill,
    ];

    /// Whether sections of this kind play once and yield back to a Main
    pub fn is_one_shot(self) -> bool {
        self != SectionKind::Main
    }

    /// Canonical label used in section names
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Intro => "Intro",
            SectionKind::Main => "Main",
            SectionKind::Ending => "Ending",
            SectionKind::Fill => "Fill In",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "intro" => Some(SectionKind::Intro),
            "main" => Some(SectionKind::Main),
            // "End X" is the older spelling still reported by some catalogs
            "ending" | "end" => Some(SectionKind::Ending),
            "fill in" | "fill" => Some(SectionKind::Fill),
            _ => None,
        }
    }
}

/// A section of a style, e.g. `Main B` or `Fill In CC`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Section {
    kind: SectionKind,
    letter: Letter,
}

impl Section {
    /// Create a section
    pub fn new(kind: SectionKind, letter: Letter) -> Self {
        Self { kind, letter }
    }

    pub fn intro(letter: Letter) -> Self {
        Self::new(SectionKind::Intro, letter)
    }

    pub fn main(letter: Letter) -> Self {
        Self::new(SectionKind::Main, letter)
    }

    pub fn ending(letter: Letter) -> Self {
        Self::new(SectionKind::Ending, letter)
    }

    /// Fill leading into `Main {letter}`
    pub fn fill(letter: Letter) -> Self {
        Self::new(SectionKind::Fill, letter)
    }

    /// Get section kind
    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// Get section letter
    pub fn letter(&self) -> Letter {
        self.letter
    }

    /// Whether this section plays once
    pub fn is_one_shot(&self) -> bool {
        self.kind.is_one_shot()
    }

    /// Parse a catalog section name
    pub fn parse(name: &str) -> Result<Self, ParseSectionError> {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        let (letters, label) = match tokens.split_last() {
            Some((last, rest)) if !rest.is_empty() => (*last, rest.join(" ")),
            _ => return Err(ParseSectionError::Malformed(name.to_string())),
        };

        let kind = SectionKind::from_label(&label)
            .ok_or_else(|| ParseSectionError::UnknownKind(label.clone()))?;

        let parsed: Option<Vec<Letter>> = letters.chars().map(Letter::from_char).collect();
        let parsed = parsed.ok_or_else(|| ParseSectionError::BadLetter(letters.to_string()))?;

        let letter = match (kind, parsed.as_slice()) {
            (_, [single]) => *single,
            (SectionKind::Fill, [first, second]) if first == second => *first,
            _ => return Err(ParseSectionError::BadLetter(letters.to_string())),
        };

        Ok(Self::new(kind, letter))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SectionKind::Fill => write!(f, "{} {}{}", self.kind.label(), self.letter, self.letter),
            kind => write!(f, "{} {}", kind.label(), self.letter),
        }
    }
}

impl FromStr for Section {
    type Err = ParseSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::parse(s)
    }
}

/// Section name parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSectionError {
    #[error("malformed section name: {0:?}")]
    Malformed(String),
    #[error("unknown section kind: {0:?}")]
    UnknownKind(String),
    #[error("bad section letter: {0:?}")]
    BadLetter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        assert_eq!(Section::parse("Intro A").unwrap(), Section::intro(Letter::A));
        assert_eq!(Section::parse("Main D").unwrap(), Section::main(Letter::D));
        assert_eq!(Section::parse("Ending B").unwrap(), Section::ending(Letter::B));
        assert_eq!(Section::parse("Fill In CC").unwrap(), Section::fill(Letter::C));
    }

    #[test]
    fn test_parse_end_synonym() {
        assert_eq!(Section::parse("End C").unwrap(), Section::ending(Letter::C));
        assert_eq!(Section::parse("End C").unwrap().to_string(), "Ending C");
    }

    #[test]
    fn test_parse_tolerates_spacing_and_case() {
        assert_eq!(Section::parse("  main  b ").unwrap(), Section::main(Letter::B));
        assert_eq!(Section::parse("FILL IN aa").unwrap(), Section::fill(Letter::A));
        assert_eq!(Section::parse("Fill A").unwrap(), Section::fill(Letter::A));
    }

    #[test]
    fn test_parse_rejects() {
        assert!(matches!(Section::parse("Main"), Err(ParseSectionError::Malformed(_))));
        assert!(matches!(Section::parse(""), Err(ParseSectionError::Malformed(_))));
        assert!(matches!(
            Section::parse("Break A"),
            Err(ParseSectionError::UnknownKind(_))
        ));
        assert!(matches!(Section::parse("Main E"), Err(ParseSectionError::BadLetter(_))));
        assert!(matches!(Section::parse("Main AA"), Err(ParseSectionError::BadLetter(_))));
        assert!(matches!(
            Section::parse("Fill In AB"),
            Err(ParseSectionError::BadLetter(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Section::intro(Letter::B).to_string(), "Intro B");
        assert_eq!(Section::fill(Letter::D).to_string(), "Fill In DD");
        let parsed: Section = "Ending A".parse().unwrap();
        assert_eq!(parsed.to_string(), "Ending A");
    }

    #[test]
    fn test_one_shot_kinds() {
        assert!(!Section::main(Letter::A).is_one_shot());
        assert!(Section::intro(Letter::A).is_one_shot());
        assert!(Section::ending(Letter::A).is_one_shot());
        assert!(Section::fill(Letter::A).is_one_shot());
    }
}
