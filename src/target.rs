// WHY: A target is either spelled out or given as a hyphenated per-word code;
// both are resolved here into the literal text plus the character that follows it

use regex_automata::meta::Regex;
use tracing::info;

use crate::error::{AnnotationError, Result};
use crate::rewrite::escape;

/// Target as resolved against a concrete text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Exact surface form as it appears in the text
    pub target: String,
    /// Space or punctuation mark right after the target
    pub delimiter: char,
}

/// Compact notation for a multi-word target, e.g. `mi-mi` for two words containing "mi"
#[derive(Debug, Clone)]
pub struct TargetCode {
    segments: Vec<String>,
    regex: Regex,
}

// The compiled pattern is derived from the segments
impl PartialEq for TargetCode {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for TargetCode {}

impl TargetCode {
    pub fn parse(code: &str) -> Result<Self> {
        let segments: Vec<String> = code.trim().split('-').map(str::to_string).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(AnnotationError::InvalidTargetCode(code.to_string()));
        }

        // Each word holds its segment, words are separated by non-word characters only,
        // and the run must be closed by a single non-word character
        let words = segments
            .iter()
            .map(|segment| format!(r"\w*?{}\w*", escape(segment)))
            .collect::<Vec<_>>()
            .join(r"\W+");
        let regex = Regex::new(&format!(r"(?i)(?:^|\W)({words})(\W)"))?;

        Ok(Self { segments, regex })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of words a resolved target will contain
    pub fn word_count(&self) -> usize {
        self.segments.len()
    }

    /// Find the first run of words matching the code in `concordance`.
    /// `None` is an expected outcome: the concordance is simply skipped.
    pub fn resolve(&self, concordance: &str) -> Result<Option<ResolvedTarget>> {
        let resolved = self.regex.captures_iter(concordance).next().and_then(|caps| {
            let target = caps.get_group(1)?;
            let delimiter = caps.get_group(2)?;
            Some(ResolvedTarget {
                target: concordance[target.range()].to_string(),
                delimiter: concordance[delimiter.range()].chars().next()?,
            })
        });

        if resolved.is_none() {
            info!("Concordance: '{}' does not contain a target: '{}'.", concordance, self);
        }
        Ok(resolved)
    }
}

impl std::fmt::Display for TargetCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("-"))
    }
}

/// What the caller asked to annotate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    Literal(String),
    Code(TargetCode),
}

impl TargetSpec {
    pub fn literal(target: impl Into<String>) -> Self {
        TargetSpec::Literal(target.into())
    }

    pub fn code(code: &str) -> Result<Self> {
        TargetCode::parse(code).map(TargetSpec::Code)
    }

    /// Resolve against `text`. Literal targets take the delimiter that follows their first
    /// word-boundary occurrence, defaulting to a space when they are not found as a whole.
    pub fn resolve(&self, text: &str) -> Result<Option<ResolvedTarget>> {
        match self {
            TargetSpec::Code(code) => code.resolve(text),
            TargetSpec::Literal(literal) => {
                let literal = literal.trim();
                if literal.is_empty() {
                    return Err(AnnotationError::InvalidInput("Empty target.".to_string()));
                }
                Ok(Some(ResolvedTarget {
                    target: literal.to_string(),
                    delimiter: literal_delimiter(literal, text)?.unwrap_or(' '),
                }))
            }
        }
    }
}

fn literal_delimiter(literal: &str, text: &str) -> Result<Option<char>> {
    let regex = Regex::new(&format!(r"(?i)(?:^| ){}(\W)", escape(literal)))?;
    let delimiter = regex
        .captures_iter(text)
        .next()
        .and_then(|caps| caps.get_group(1))
        .and_then(|span| text[span.range()].chars().next());
    Ok(delimiter)
}

/// Resolve a target code against a concordance
pub fn resolve_target(target_code: &str, concordance: &str) -> Result<Option<ResolvedTarget>> {
    TargetCode::parse(target_code)?.resolve(concordance)
}
