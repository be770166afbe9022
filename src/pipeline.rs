// WHY: Per-concordance glue: normalize, resolve, extract, choose, compose, normalize again
// A batch never aborts on one bad concordance; failures are collected and logged instead

use rand::Rng;
use tracing::{info, warn};

use crate::annotation::{compose_annotation, Provenance};
use crate::error::{AnnotationError, Result};
use crate::extractor::SentenceExtractor;
use crate::punctuation::PunctuationNormalizer;
use crate::sentence_detector::{SentenceDetector, SentenceSplitter};
use crate::target::TargetSpec;
use crate::variant::VariantSet;

/// Why a concordance produced no annotated sentence
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The target code matched nothing in this concordance
    TargetNotResolved,
    Failed(AnnotationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedConcordance {
    /// Position in the input batch
    pub index: usize,
    pub concordance: String,
    pub reason: SkipReason,
}

/// Outcome of a batch run, annotated sentences in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub annotated: Vec<String>,
    pub skipped: Vec<SkippedConcordance>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.annotated.len() + self.skipped.len()
    }
}

/// Everything needed to annotate concordances for one target
pub struct AnnotationPipeline<S = SentenceDetector> {
    target: TargetSpec,
    variants: VariantSet,
    is_target_valid: bool,
    provenance: Provenance,
    normalizer: PunctuationNormalizer,
    extractor: SentenceExtractor<S>,
}

impl AnnotationPipeline<SentenceDetector> {
    pub fn new(
        target: TargetSpec,
        variants: VariantSet,
        is_target_valid: bool,
        provenance: Provenance,
    ) -> Result<Self> {
        Self::with_extractor(target, variants, is_target_valid, provenance, SentenceExtractor::new()?)
    }
}

impl<S: SentenceSplitter> AnnotationPipeline<S> {
    pub fn with_extractor(
        target: TargetSpec,
        variants: VariantSet,
        is_target_valid: bool,
        provenance: Provenance,
        extractor: SentenceExtractor<S>,
    ) -> Result<Self> {
        Ok(Self {
            target,
            variants,
            is_target_valid,
            provenance,
            normalizer: PunctuationNormalizer::new()?,
            extractor,
        })
    }

    /// Annotate one concordance. `Ok(None)` means the target code was not found, which is
    /// an expected outcome for corpus hits.
    pub fn annotate<R: Rng + ?Sized>(&self, concordance: &str, rng: &mut R) -> Result<Option<String>> {
        let normalized = self.normalizer.normalize(concordance);

        let (sentence, resolved) = match &self.target {
            TargetSpec::Code(code) => {
                let Some(resolved) = code.resolve(&normalized)? else {
                    return Ok(None);
                };
                let sentence = self.extractor.extract(&normalized, &resolved.target)?;
                (sentence, resolved)
            }
            TargetSpec::Literal(literal) => {
                let sentence = self.extractor.extract(&normalized, literal)?;
                match self.target.resolve(&sentence)? {
                    Some(resolved) => (sentence, resolved),
                    None => return Ok(None),
                }
            }
        };

        let variant = self.variants.choose_for(&resolved.target, rng)?;
        let composed = compose_annotation(
            &sentence,
            &resolved.target,
            resolved.delimiter,
            &variant,
            self.is_target_valid,
            self.provenance,
        )?;
        Ok(Some(self.normalizer.normalize(&composed)))
    }

    /// Annotate many concordances, skipping the ones that fail
    pub fn annotate_batch<R, I, C>(&self, concordances: I, rng: &mut R) -> BatchReport
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let mut report = BatchReport::default();

        for (index, concordance) in concordances.into_iter().enumerate() {
            let concordance = concordance.as_ref();
            let reason = match self.annotate(concordance, rng) {
                Ok(Some(sentence)) => {
                    report.annotated.push(sentence);
                    continue;
                }
                Ok(None) => {
                    info!(index, "Skipping concordance, target not resolved");
                    SkipReason::TargetNotResolved
                }
                Err(err) => {
                    warn!(index, "Skipping concordance: {}", err);
                    SkipReason::Failed(err)
                }
            };
            report.skipped.push(SkippedConcordance {
                index,
                concordance: concordance.to_string(),
                reason,
            });
        }

        info!(
            "Annotated {} of {} concordances",
            report.annotated.len(),
            report.processed()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn literal_pipeline() -> AnnotationPipeline {
        AnnotationPipeline::new(
            TargetSpec::literal("jejích"),
            VariantSet::literals(["jejich"], None).unwrap(),
            false,
            Provenance::Corpus,
        )
        .unwrap()
    }

    #[test]
    fn test_literal_target_end_to_end() {
        let mut rng = StdRng::seed_from_u64(1);
        let pipeline = literal_pipeline();
        let annotated = pipeline
            .annotate("ní. Stál před jejích chalupou , bylo ticho. Pak odešel.", &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(annotated, "Stál před [*jejích|jejich|corpus*] chalupou, bylo ticho.");
    }

    #[test]
    fn test_literal_target_before_punctuation() {
        let mut rng = StdRng::seed_from_u64(1);
        let annotated = literal_pipeline()
            .annotate("To byl dům jejích . A další věta.", &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(annotated, "To byl dům [*jejích|jejich|corpus*].");
    }

    #[test]
    fn test_closed_quotation_before_target_sentence_is_cut_off() {
        let mut rng = StdRng::seed_from_u64(1);
        let annotated = literal_pipeline()
            .annotate(r#"Řekl: "Nechci." Stál před jejích chalupou."#, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(annotated, "Stál před [*jejích|jejich|corpus*] chalupou.");
    }

    #[test]
    fn test_code_target_with_variant_code() {
        let mut rng = StdRng::seed_from_u64(1);
        let pipeline = AnnotationPipeline::new(
            TargetSpec::code("ma-ma").unwrap(),
            VariantSet::codes(["i-i"], None).unwrap(),
            true,
            Provenance::Synthetic,
        )
        .unwrap();
        let annotated = pipeline
            .annotate("Šel se zavřenýma očima domů. Bylo pozdě.", &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(
            annotated,
            "Šel se [*inýma i|zavřenýma očima|synthetic*] domů."
        );
    }

    #[test]
    fn test_batch_skips_and_keeps_order() {
        let mut rng = StdRng::seed_from_u64(9);
        let pipeline = AnnotationPipeline::new(
            TargetSpec::code("mi-mi").unwrap(),
            VariantSet::literals(["tvýma kamarádkama"], None).unwrap(),
            true,
            Provenance::Corpus,
        )
        .unwrap();
        let report = pipeline.annotate_batch(
            [
                "S tvými kamarádkami nechci mít nic společného.",
                "Tady žádný cíl není.",
                "Byl jsem s jeho bratrem. Pak s těmi kamarádkami odešel.",
            ],
            &mut rng,
        );
        assert_eq!(report.processed(), 3);
        assert_eq!(report.annotated.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::TargetNotResolved);
        assert!(report.annotated[0].starts_with("S [*tvýma kamarádkama|tvými kamarádkami|corpus*]"));
        assert!(report.annotated[1].starts_with("Pak s [*"));
        for sentence in &report.annotated {
            assert_eq!(Annotation::spans(sentence).len(), 1);
        }
    }

    #[test]
    fn test_missing_literal_is_reported_not_fatal() {
        let mut rng = StdRng::seed_from_u64(2);
        let report = literal_pipeline().annotate_batch(vec!["Nic tu není.".to_string()], &mut rng);
        assert!(report.annotated.is_empty());
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::Failed(AnnotationError::TargetNotFound { .. })
        ));
    }
}
