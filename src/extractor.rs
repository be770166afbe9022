// WHY: Cuts a concordance down to the one sentence holding the target
// Corpus windows start mid-sentence and split quotations, so the chosen sentence is repaired
// (missing opening quote) and trimmed (leading fragment noise) before it is returned

use std::borrow::Cow;
use std::sync::OnceLock;

use regex_automata::meta::Regex;
use tracing::debug;

use crate::error::{AnnotationError, Result};
use crate::rewrite::escape;
use crate::sentence_detector::{SentenceDetector, SentenceSplitter};

/// Czech opening double quote
pub const QUOTE_OPEN: char = '„';

/// Closing double quotes that imply an opening quote somewhere before them
pub const QUOTE_CLOSE: &[char] = &['“', '”'];

/// How many leading characters may be dropped to reach the first capital letter
pub const LEFT_TRIM_WINDOW: usize = 10;

/// Uppercase letters of the Czech alphabet
const UPPERCASE_CLASS: &str = "A-ZÁČĎÉĚÍŇÓŘŠŤÚŮÝŽ";

/// Sentence extractor over any [`SentenceSplitter`]
pub struct SentenceExtractor<S = SentenceDetector> {
    splitter: S,
    capital_start: Regex,
    empty_quote: Regex,
}

impl SentenceExtractor<SentenceDetector> {
    /// Extractor backed by the built-in sentence detector
    pub fn new() -> Result<Self> {
        Self::with_splitter(SentenceDetector::with_default_rules()?)
    }
}

impl<S: SentenceSplitter> SentenceExtractor<S> {
    pub fn with_splitter(splitter: S) -> Result<Self> {
        // WHY: the opening quote and parenthesis must never be skipped over
        let capital_start = format!(r"^[^({QUOTE_OPEN}]{{0,{LEFT_TRIM_WINDOW}}}?([{UPPERCASE_CLASS}])");
        let empty_quote = format!("^{QUOTE_OPEN} ?[{}]", QUOTE_CLOSE.iter().collect::<String>());
        Ok(Self {
            splitter,
            capital_start: Regex::new(&capital_start)?,
            empty_quote: Regex::new(&empty_quote)?,
        })
    }

    /// Return the first sentence of `concordance` containing `target` (case-insensitive),
    /// left-trimmed of fragment noise
    pub fn extract(&self, concordance: &str, target: &str) -> Result<String> {
        let target = target.trim();
        if concordance.trim().is_empty() || target.is_empty() {
            return Err(AnnotationError::InvalidInput(
                "Empty input. Please provide valid concordance and target.".to_string(),
            ));
        }

        let target_pattern = Regex::new(&format!("(?i){}", escape(target)))?;

        for sentence in self.splitter.split(concordance) {
            let repaired = repair_open_quote(sentence.raw());
            if let Some(found) = target_pattern.find(repaired.as_ref()) {
                debug!(index = sentence.index, "Found target '{}' in sentence", target);
                return Ok(self.trim_left_before(&repaired, found.start()).to_string());
            }
        }

        Err(AnnotationError::TargetNotFound {
            target: target.to_string(),
            text: concordance.to_string(),
        })
    }

    /// Drop everything before the first capital letter if it sits within the window,
    /// otherwise drop a leading empty quotation
    pub fn trim_left<'a>(&self, sentence: &'a str) -> &'a str {
        self.trim_left_before(sentence, sentence.len())
    }

    /// Like [`Self::trim_left`], but never cuts past byte offset `keep_from`
    pub fn trim_left_before<'a>(&self, sentence: &'a str, keep_from: usize) -> &'a str {
        let capital = self
            .capital_start
            .captures_iter(sentence)
            .next()
            .and_then(|caps| caps.get_group(1));
        if let Some(capital) = capital {
            if capital.start <= keep_from {
                return &sentence[capital.start..];
            }
            return sentence;
        }
        if let Some(mat) = self.empty_quote.find(sentence) {
            if mat.end() <= keep_from {
                return &sentence[mat.end()..];
            }
        }
        sentence
    }
}

/// Prepend the opening quote when a sentence only carries the closing one
pub fn repair_open_quote(sentence: &str) -> Cow<'_, str> {
    if sentence.contains(QUOTE_CLOSE) && !sentence.contains(QUOTE_OPEN) {
        Cow::Owned(format!("{QUOTE_OPEN}{sentence}"))
    } else {
        Cow::Borrowed(sentence)
    }
}

fn shared_extractor() -> &'static SentenceExtractor {
    static EXTRACTOR: OnceLock<SentenceExtractor> = OnceLock::new();
    EXTRACTOR.get_or_init(|| {
        SentenceExtractor::new().expect("built-in sentence patterns are valid")
    })
}

/// Extract with the built-in sentence detector
pub fn extract_sentence_with_target(concordance: &str, target: &str) -> Result<String> {
    shared_extractor().extract(concordance, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence_detector::DetectedSentence;

    #[test]
    fn test_extracts_sentence_with_target() {
        let concordance = "Byl tam. Stál před jejích chalupou. Pak odešel.";
        assert_eq!(
            extract_sentence_with_target(concordance, "jejích").unwrap(),
            "Stál před jejích chalupou."
        );
    }

    #[test]
    fn test_target_match_is_case_insensitive() {
        let concordance = "Nic. Jejích dům stál opodál.";
        assert_eq!(
            extract_sentence_with_target(concordance, "JEJÍCH ").unwrap(),
            "Jejích dům stál opodál."
        );
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(
            extract_sentence_with_target("", "slovo"),
            Err(AnnotationError::InvalidInput(_))
        ));
        assert!(matches!(
            extract_sentence_with_target("Nějaký text.", "  "),
            Err(AnnotationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_target() {
        let err = extract_sentence_with_target("Prší. Je zima.", "slunce").unwrap_err();
        assert!(matches!(err, AnnotationError::TargetNotFound { .. }));
    }

    #[test]
    fn test_left_trim_to_capital_within_window() {
        let extractor = SentenceExtractor::new().unwrap();
        assert_eq!(extractor.trim_left("123 Slovo stojí."), "Slovo stojí.");
        assert_eq!(extractor.trim_left("ní domu. A pak"), "A pak");
        assert_eq!(extractor.trim_left("Hned velké."), "Hned velké.");
        assert_eq!(extractor.trim_left("ře Šel domů."), "Šel domů.");
    }

    #[test]
    fn test_left_trim_never_cuts_off_target() {
        assert_eq!(
            extract_sentence_with_target("s jejích Pavlem stál.", "jejích").unwrap(),
            "s jejích Pavlem stál."
        );
        assert_eq!(
            extract_sentence_with_target("ní. a jejích Novák", "Novák").unwrap(),
            "Novák"
        );
        let extractor = SentenceExtractor::new().unwrap();
        assert_eq!(extractor.trim_left_before("ab Praha je tu", 3), "Praha je tu");
        assert_eq!(extractor.trim_left_before("ab Praha je tu", 0), "ab Praha je tu");
    }

    #[test]
    fn test_left_trim_keeps_sentence_without_near_capital() {
        let extractor = SentenceExtractor::new().unwrap();
        let sentence = "dlouhý začátek bez velkého písmene a pak Praha.";
        assert_eq!(extractor.trim_left(sentence), sentence);
    }

    #[test]
    fn test_left_trim_never_skips_quote_or_parenthesis() {
        let extractor = SentenceExtractor::new().unwrap();
        assert_eq!(extractor.trim_left("„Ahoj,“ řekl."), "„Ahoj,“ řekl.");
        assert_eq!(extractor.trim_left("ab (Poznámka) text"), "ab (Poznámka) text");
    }

    #[test]
    fn test_left_trim_drops_empty_quotation() {
        let extractor = SentenceExtractor::new().unwrap();
        assert_eq!(extractor.trim_left("„ “ řekl to."), " řekl to.");
        assert_eq!(extractor.trim_left("„“řekl to."), "řekl to.");
    }

    #[test]
    fn test_split_quotation_is_repaired() {
        let concordance = "„Ahoj. Jak se máš?“ zeptal se tvůj kamarád.";
        assert_eq!(
            extract_sentence_with_target(concordance, "kamarád").unwrap(),
            "„Jak se máš?“ zeptal se tvůj kamarád."
        );
    }

    #[test]
    fn test_repair_open_quote() {
        assert_eq!(repair_open_quote("řekl.“"), "„řekl.“");
        assert_eq!(repair_open_quote("„celé“"), "„celé“");
        assert!(matches!(repair_open_quote("bez uvozovek"), Cow::Borrowed(_)));
    }

    struct LineSplitter;

    impl SentenceSplitter for LineSplitter {
        fn split<'a>(&self, text: &'a str) -> Vec<DetectedSentence<'a>> {
            let mut offset = 0;
            text.split('\n')
                .enumerate()
                .map(|(index, line)| {
                    let start = offset;
                    offset += line.len() + 1;
                    DetectedSentence {
                        index,
                        raw_content: line,
                        span: crate::sentence_detector::Span {
                            start_byte: start,
                            end_byte: start + line.len(),
                        },
                    }
                })
                .collect()
        }
    }

    #[test]
    fn test_custom_splitter() {
        let extractor = SentenceExtractor::with_splitter(LineSplitter).unwrap();
        assert_eq!(
            extractor.extract("První řádek\nDruhý. Řádek s cílem", "cílem").unwrap(),
            "Druhý. Řádek s cílem"
        );
    }
}
