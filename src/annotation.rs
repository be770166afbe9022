// WHY: The inline annotation `[*error|correct|tag*]` is the one wire format downstream
// training code reads, so composing and reading it back live together here

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex_automata::meta::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnnotationError, Result};
use crate::rewrite::{escape, escape_replacement, replace_first};

/// Where the error in an annotated sentence comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The sentence is an attested corpus occurrence
    #[default]
    Corpus,
    /// The error was introduced artificially
    Synthetic,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Corpus => "corpus",
            Provenance::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provenance {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "corpus" => Ok(Provenance::Corpus),
            "synthetic" => Ok(Provenance::Synthetic),
            other => Err(AnnotationError::InvalidInput(format!("Unknown provenance tag '{other}'"))),
        }
    }
}

/// One `[*error|correct|tag*]` span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub error: String,
    pub correct: String,
    pub provenance: Provenance,
}

impl Annotation {
    /// Place `target` and `variant` into the error/correct slots according to which one is
    /// orthographically valid
    pub fn new(target: &str, variant: &str, is_target_valid: bool, provenance: Provenance) -> Self {
        let (error, correct) = if is_target_valid {
            (variant, target)
        } else {
            (target, variant)
        };
        Self {
            error: error.to_string(),
            correct: correct.to_string(),
            provenance,
        }
    }

    /// First annotation span found in `text`
    pub fn find(text: &str) -> Option<Self> {
        span_pattern()
            .captures_iter(text)
            .next()
            .and_then(|caps| caps.get_group(1))
            .and_then(|inner| text[inner.range()].parse().ok())
    }

    /// Every `[*...*]` span in `text`, as raw strings
    pub fn spans(text: &str) -> Vec<&str> {
        span_pattern()
            .find_iter(text)
            .map(|mat| &text[mat.range()])
            .collect()
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[*{}|{}|{}*]", self.error, self.correct, self.provenance)
    }
}

impl FromStr for Annotation {
    type Err = AnnotationError;

    /// Parse the inside of a span, `error|correct|tag`
    fn from_str(inner: &str) -> Result<Self> {
        let fields: Vec<&str> = inner.split('|').collect();
        match fields.as_slice() {
            [error, correct, tag] => Ok(Self {
                error: error.to_string(),
                correct: correct.to_string(),
                provenance: tag.parse()?,
            }),
            _ => Err(AnnotationError::InvalidInput(format!(
                "Annotation '{inner}' does not have three fields"
            ))),
        }
    }
}

fn span_pattern() -> &'static Regex {
    static SPAN: OnceLock<Regex> = OnceLock::new();
    SPAN.get_or_init(|| Regex::new(r"\[\*(.*?)\*\]").expect("annotation span pattern is valid"))
}

/// Replace the first word-initial occurrence of `target` + `delimiter` in `sentence` with the
/// annotation span, keeping the delimiter after it.
///
/// When the exact delimiter does not follow the target, the target is still accepted at a
/// word end and whatever follows it is kept as is.
pub fn compose_annotation(
    sentence: &str,
    target: &str,
    delimiter: char,
    variant: &str,
    is_target_valid: bool,
    provenance: Provenance,
) -> Result<String> {
    let target = target.trim();
    if target.is_empty() {
        return Err(AnnotationError::InvalidInput("Empty target.".to_string()));
    }
    let annotation = Annotation::new(target, variant, is_target_valid, provenance);
    let span = escape_replacement(&annotation.to_string());
    let escaped_target = escape(target);

    let exact = Regex::new(&format!(
        "(?i)(?:^| ){}{}",
        escaped_target,
        escape(&delimiter.to_string())
    ))?;
    let replacement = format!(" {}{}", span, escape_replacement(&delimiter.to_string()));
    if let Some(composed) = replace_first(&exact, sentence, &replacement) {
        return Ok(composed.trim().to_string());
    }

    debug!(
        "Delimiter {:?} does not follow '{}', falling back to word end",
        delimiter, target
    );
    let word_end = Regex::new(&format!(r"(?i)(?:^| ){escaped_target}(\W|$)"))?;
    replace_first(&word_end, sentence, &format!(" {span}$1"))
        .map(|composed| composed.trim().to_string())
        .ok_or_else(|| AnnotationError::TargetNotFound {
            target: target.to_string(),
            text: sentence.to_string(),
        })
}
