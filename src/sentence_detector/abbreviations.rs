// WHY: Centralized abbreviation handling for sentence boundary detection
// A period after one of these words does not end a Czech sentence

use std::collections::HashSet;

/// Titles and forms of address that precede a name, e.g. "Ing. Novák", "p. Dvořák"
pub const TITLE_ABBREVIATIONS: &[&str] = &[
    "Bc.", "Mgr.", "Ing.", "MUDr.", "MVDr.", "JUDr.", "PhDr.", "RNDr.", "Dr.", "doc.", "prof.",
    "p.", "pí.", "sl.", "sv.", "Mr.", "Mrs.", "Ms.",
];

/// Common running-text abbreviations
pub const ABBREVIATIONS: &[&str] = &[
    "např.", "tj.", "tzv.", "tzn.", "atd.", "apod.", "aj.", "resp.", "mj.", "popř.", "příp.",
    "event.", "cca.", "viz.", "srov.", "str.", "s.", "č.", "r.", "st.", "stol.", "odst.",
    "písm.", "kap.", "obr.", "tab.", "roč.", "hod.", "min.", "max.", "ul.", "nám.", "ml.",
    "př.", "n.", "l.", "etc.", "vs.", "al.",
];

/// Quote and bracket characters peeled off a word before lookup
const WRAPPING_MARKS: &[char] = &['"', '\'', '„', '“', '”', '‚', '‘', '’', '»', '«', '(', '['];

/// Efficient abbreviation lookup using HashSet for O(1) performance
pub struct AbbreviationChecker {
    abbreviations: HashSet<String>,
    title_abbreviations: HashSet<String>,
}

impl AbbreviationChecker {
    /// Create new abbreviation checker with default abbreviation sets
    pub fn new() -> Self {
        Self {
            abbreviations: ABBREVIATIONS.iter().map(|a| a.to_lowercase()).collect(),
            title_abbreviations: TITLE_ABBREVIATIONS.iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    /// Check if a word (including its trailing period) is a known abbreviation
    pub fn is_abbreviation(&self, word: &str) -> bool {
        let lowered = word.to_lowercase();
        self.abbreviations.contains(&lowered) || self.title_abbreviations.contains(&lowered)
    }

    /// Check if a word is a title abbreviation
    pub fn is_title_abbreviation(&self, word: &str) -> bool {
        self.title_abbreviations.contains(&word.to_lowercase())
    }

    /// Check if text ends with an abbreviation that should not split sentences
    pub fn ends_with_abbreviation(&self, text: &str) -> bool {
        last_word(text).is_some_and(|word| self.is_abbreviation(word))
    }
}

impl Default for AbbreviationChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Last whitespace-separated word with wrapping quotes and brackets removed
pub fn last_word(text: &str) -> Option<&str> {
    text.split_whitespace()
        .last()
        .map(|word| word.trim_start_matches(WRAPPING_MARKS))
}
