// WHY: Sentence boundary detection behind a trait so the extractor can take any tokenizer
// The built-in detector finds candidate boundaries with a regex and vetoes false ones

use regex_automata::meta::Regex;
use tracing::debug;

use crate::error::Result;

pub mod abbreviations;

pub use abbreviations::AbbreviationChecker;

/// Byte range of a sentence inside the text it was detected in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
}

/// Sentence borrowed from the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSentence<'a> {
    pub index: usize,
    pub raw_content: &'a str,
    pub span: Span,
}

impl<'a> DetectedSentence<'a> {
    pub fn raw(&self) -> &'a str {
        self.raw_content
    }
}

/// Anything that can cut a paragraph into sentences in reading order
pub trait SentenceSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<DetectedSentence<'a>>;
}

/// Configuration for sentence boundary detection rules
#[derive(Debug, Clone)]
pub struct SentenceBoundaryRules {
    /// End punctuation characters that can terminate a sentence
    pub end_punctuation: Vec<char>,
    /// Closing marks that stay attached to the sentence they follow
    pub trailing_marks: Vec<char>,
    /// Typographic closing quotes; they end a sentence only before an uppercase start
    pub closing_quotes: Vec<char>,
}

impl Default for SentenceBoundaryRules {
    fn default() -> Self {
        Self {
            end_punctuation: vec!['.', '?', '!'],
            trailing_marks: vec!['"', '\'', ')', ']'],
            // WHY: "?“ zeptal se" continues the sentence, ".“ Pak" does not
            closing_quotes: vec!['“', '”'],
        }
    }
}

impl SentenceBoundaryRules {
    fn boundary_pattern(&self) -> String {
        let class = |chars: &[char]| -> String {
            chars
                .iter()
                .map(|c| regex_syntax::escape(&c.to_string()))
                .collect()
        };
        let mut pattern = format!("[{}]+", class(&self.end_punctuation));
        for marks in [&self.trailing_marks, &self.closing_quotes] {
            if !marks.is_empty() {
                pattern.push_str(&format!("[{}]*", class(marks)));
            }
        }
        pattern.push_str("\\s+");
        pattern
    }
}

/// Regex-driven sentence detector with abbreviation, initial and ordinal vetoes
pub struct SentenceDetector {
    boundary: Regex,
    closing_quotes: Vec<char>,
    abbreviations: AbbreviationChecker,
}

impl SentenceDetector {
    /// Create new sentence detector with custom rules
    pub fn new(rules: SentenceBoundaryRules) -> Result<Self> {
        let pattern = rules.boundary_pattern();
        debug!("Compiling sentence boundary pattern: {}", pattern);
        Ok(Self {
            boundary: Regex::new(&pattern)?,
            closing_quotes: rules.closing_quotes,
            abbreviations: AbbreviationChecker::new(),
        })
    }

    /// Create sentence detector with default rules
    pub fn with_default_rules() -> Result<Self> {
        Self::new(SentenceBoundaryRules::default())
    }

    /// Decide whether a candidate boundary really ends a sentence
    fn is_boundary(&self, before: &str, terminator: &str, after: &str) -> bool {
        if terminator.contains(self.closing_quotes.as_slice()) {
            let next = after.chars().next();
            if !next.is_some_and(|c| c.is_uppercase() || c == '„') {
                return false;
            }
        }
        if !terminator.starts_with('.') {
            return true;
        }
        let Some(word) = abbreviations::last_word(before) else {
            return true;
        };
        let with_period = format!("{word}.");
        if self.abbreviations.is_abbreviation(&with_period) {
            return false;
        }
        let mut chars = word.chars();
        // Initials such as "J. Novák"
        if let (Some(first), None) = (chars.next(), chars.next()) {
            if first.is_alphabetic() {
                return false;
            }
        }
        // Czech ordinals such as "5. května"
        let next_is_lowercase = after.chars().next().is_some_and(char::is_lowercase);
        if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) && next_is_lowercase {
            return false;
        }
        true
    }
}

impl SentenceSplitter for SentenceDetector {
    fn split<'a>(&self, text: &'a str) -> Vec<DetectedSentence<'a>> {
        let mut sentences = Vec::new();
        let mut sentence_start = 0;

        for mat in self.boundary.find_iter(text) {
            let matched = &text[mat.start()..mat.end()];
            let terminator_len = matched.trim_end().len();
            let sentence_end = mat.start() + terminator_len;

            let before = &text[sentence_start..mat.start()];
            let terminator = &matched[..terminator_len];
            let after = &text[mat.end()..];
            if after.is_empty() || !self.is_boundary(before, terminator, after) {
                continue;
            }

            push_trimmed(&mut sentences, text, sentence_start, sentence_end);
            sentence_start = mat.end();
        }

        // Handle remaining text as final sentence if non-empty
        push_trimmed(&mut sentences, text, sentence_start, text.len());

        debug!("Detected {} sentences", sentences.len());
        sentences
    }
}

fn push_trimmed<'a>(sentences: &mut Vec<DetectedSentence<'a>>, text: &'a str, start: usize, end: usize) {
    let slice = &text[start..end];
    let trimmed_start = start + (slice.len() - slice.trim_start().len());
    let trimmed_end = start + slice.trim_end().len();
    if trimmed_start >= trimmed_end {
        return;
    }
    sentences.push(DetectedSentence {
        index: sentences.len(),
        raw_content: &text[trimmed_start..trimmed_end],
        span: Span {
            start_byte: trimmed_start,
            end_byte: trimmed_end,
        },
    });
}
