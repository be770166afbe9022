use thiserror::Error;

/// Failures of a single concordance passing through the annotation core.
/// WHY: every variant is scoped to one item so a batch can log it and move on
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Target '{target}' not found in: '{text}'")]
    TargetNotFound { target: String, text: String },

    #[error("Variants and weights differ in length. Variants: {variants}, Weights: {weights}")]
    WeightMismatch { variants: usize, weights: usize },

    #[error("Weights cannot be sampled: {0}")]
    InvalidWeights(String),

    #[error("Variant code '{code}' has {segments} segments but target '{target}' has {words} words")]
    SegmentCountMismatch {
        target: String,
        code: String,
        words: usize,
        segments: usize,
    },

    #[error("Invalid target code '{0}'")]
    InvalidTargetCode(String),

    #[error("Failed to build pattern: {0}")]
    Pattern(String),
}

impl From<regex_automata::meta::BuildError> for AnnotationError {
    fn from(err: regex_automata::meta::BuildError) -> Self {
        AnnotationError::Pattern(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
