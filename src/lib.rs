pub mod annotation;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extractor;
pub mod output;
pub mod pipeline;
pub mod punctuation;
pub mod query_log;
pub mod rewrite;
pub mod sentence_detector;
pub mod target;
pub mod variant;

// Re-export main types for convenient access
pub use annotation::{compose_annotation, Annotation, Provenance};
pub use error::{AnnotationError, Result};
pub use extractor::{extract_sentence_with_target, SentenceExtractor};
pub use pipeline::{AnnotationPipeline, BatchReport, SkipReason, SkippedConcordance};
pub use punctuation::{normalize, PunctuationNormalizer};
pub use sentence_detector::{DetectedSentence, SentenceDetector, SentenceSplitter, Span};
pub use target::{resolve_target, ResolvedTarget, TargetCode, TargetSpec};
pub use variant::{choose_variant, derive_variant_from_code, VariantCode, VariantSet, VariantSpec};

// Re-export persistence helpers used by the CLI
pub use corpus::{ConcordanceSource, CorpusHit, CorpusManager, ExportFile};
pub use output::{annotation_file_path, append_annotations, count_annotations, remove_duplicates};
pub use query_log::{LookingFor, QueryEntry, QueryLog};
