// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-beat section availability.
//!
//! The catalog reports a flat `name -> present` map. The table keeps
//! only present sections, keyed by their typed name, and remembers the
//! exact spelling the catalog used so audio locators match its files.

use std::collections::HashMap;

use tracing::debug;

use super::{Letter, Section, SectionKind};

/// Which sections exist for one beat
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityTable {
    /// Present sections -> name as reported by the catalog
    entries: HashMap<Section, String>,
}

impl AvailabilityTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from the catalog's raw presence map
    pub fn from_map(map: &HashMap<String, bool>) -> Self {
        let mut table = Self::new();
        for (name, present) in map {
            if !*present {
                continue;
            }
            match Section::parse(name) {
                Ok(section) => table.insert(section, name),
                Err(e) => debug!(name = %name, error = %e, "ignoring unrecognised section"),
            }
        }
        table
    }

    /// Build a table from an iterator of present sections using canonical names
    pub fn from_sections(sections: impl IntoIterator<Item = Section>) -> Self {
        let mut table = Self::new();
        for section in sections {
            table.insert(section, &section.to_string());
        }
        table
    }

    fn insert(&mut self, section: Section, name: &str) {
        let canonical = section.to_string();
        let name = name.trim();
        match self.entries.get(&section) {
            // Both spellings present: prefer the canonical one so lookups are stable
            Some(existing) if *existing == canonical => {}
            Some(_) if name != canonical => {}
            _ => {
                self.entries.insert(section, name.to_string());
            }
        }
    }

    /// Check if a section is present
    pub fn is_available(&self, section: Section) -> bool {
        self.entries.contains_key(&section)
    }

    /// Name the catalog uses for a present section
    pub fn catalog_name(&self, section: Section) -> Option<&str> {
        self.entries.get(&section).map(String::as_str)
    }

    /// First present Main in order A, B, C, D
    pub fn first_available_main(&self) -> Option<Letter> {
        Letter::ALL
            .into_iter()
            .find(|&letter| self.is_available(Section::main(letter)))
    }

    /// Present sections of one kind, in letter order
    pub fn letters(&self, kind: SectionKind) -> Vec<Letter> {
        Letter::ALL
            .into_iter()
            .filter(|&letter| self.is_available(Section::new(kind, letter)))
            .collect()
    }

    /// All present sections, sorted
    pub fn sections(&self) -> Vec<Section> {
        let mut sections: Vec<Section> = self.entries.keys().copied().collect();
        sections.sort();
        sections
    }

    /// Number of present sections
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no section is present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, bool)]) -> HashMap<String, bool> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_from_map_keeps_present_sections() {
        let table = AvailabilityTable::from_map(&map(&[
            ("Main A", true),
            ("Main B", false),
            ("Intro A", true),
            ("Fill In AA", true),
        ]));

        assert_eq!(table.len(), 3);
        assert!(table.is_available(Section::main(Letter::A)));
        assert!(!table.is_available(Section::main(Letter::B)));
        assert!(table.is_available(Section::fill(Letter::A)));
    }

    #[test]
    fn test_end_and_ending_are_interchangeable() {
        let table = AvailabilityTable::from_map(&map(&[("End B", true)]));
        assert!(table.is_available(Section::ending(Letter::B)));
        assert_eq!(table.catalog_name(Section::ending(Letter::B)), Some("End B"));
    }

    #[test]
    fn test_canonical_spelling_wins() {
        let table = AvailabilityTable::from_map(&map(&[("End C", true), ("Ending C", true)]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.catalog_name(Section::ending(Letter::C)), Some("Ending C"));
    }

    #[test]
    fn test_absent_synonym_does_not_hide_present_one() {
        let table = AvailabilityTable::from_map(&map(&[("End D", true), ("Ending D", false)]));
        assert!(table.is_available(Section::ending(Letter::D)));
    }

    #[test]
    fn test_unknown_names_ignored() {
        let table = AvailabilityTable::from_map(&map(&[("Break A", true), ("garbage", true)]));
        assert!(table.is_empty());
    }

    #[test]
    fn test_first_available_main() {
        let table = AvailabilityTable::from_sections([
            Section::main(Letter::D),
            Section::main(Letter::B),
        ]);
        assert_eq!(table.first_available_main(), Some(Letter::B));
        assert_eq!(table.letters(SectionKind::Main), vec![Letter::B, Letter::D]);

        let empty = AvailabilityTable::from_sections([Section::intro(Letter::A)]);
        assert_eq!(empty.first_available_main(), None);
    }

    #[test]
    fn test_sections_sorted() {
        let table = AvailabilityTable::from_sections([
            Section::ending(Letter::A),
            Section::main(Letter::B),
            Section::intro(Letter::C),
        ]);
        assert_eq!(
            table.sections(),
            vec![
                Section::intro(Letter::C),
                Section::main(Letter::B),
                Section::ending(Letter::A),
            ]
        );
    }
}
