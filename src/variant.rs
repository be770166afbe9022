// WHY: Picks the competing form written into the annotation
// Randomness always comes from the caller's Rng so runs can be seeded and replayed

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{AnnotationError, Result};

/// Number of leading characters of each target word replaced by a variant code segment
pub const CODE_REPLACED_CHARS: usize = 5;

/// Per-word rewrite of a resolved target, e.g. `a-a-a` for a three-word target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCode {
    segments: Vec<String>,
}

impl VariantCode {
    pub fn parse(code: &str) -> Self {
        Self {
            segments: code.trim().split('-').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Replace the first [`CODE_REPLACED_CHARS`] characters of every target word with the
    /// matching segment. Shorter words are replaced whole.
    pub fn derive(&self, target: &str) -> Result<String> {
        let words: Vec<&str> = target.trim().split(' ').collect();
        if words.len() != self.segments.len() {
            return Err(AnnotationError::SegmentCountMismatch {
                target: target.to_string(),
                code: self.to_string(),
                words: words.len(),
                segments: self.segments.len(),
            });
        }

        let derived: Vec<String> = words
            .iter()
            .zip(&self.segments)
            .map(|(word, segment)| {
                let rest: String = word.chars().skip(CODE_REPLACED_CHARS).collect();
                format!("{segment}{rest}")
            })
            .collect();
        Ok(derived.join(" "))
    }
}

impl std::fmt::Display for VariantCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("-"))
    }
}

/// One candidate: a ready string or a code applied to the resolved target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantSpec {
    Literal(String),
    Code(VariantCode),
}

impl VariantSpec {
    /// Produce the surface form for the given resolved target
    pub fn realize(&self, target: &str) -> Result<String> {
        match self {
            VariantSpec::Literal(variant) => Ok(variant.clone()),
            VariantSpec::Code(code) => code.derive(target),
        }
    }
}

/// Candidate variants with optional relative weights
#[derive(Debug, Clone)]
pub struct VariantSet {
    variants: Vec<VariantSpec>,
    weights: Option<WeightedIndex<f64>>,
}

impl VariantSet {
    pub fn new(variants: Vec<VariantSpec>, weights: Option<Vec<f64>>) -> Result<Self> {
        if variants.is_empty() {
            return Err(AnnotationError::InvalidInput("No variants given.".to_string()));
        }
        let weights = match weights {
            None => None,
            Some(weights) => {
                if weights.len() != variants.len() {
                    return Err(AnnotationError::WeightMismatch {
                        variants: variants.len(),
                        weights: weights.len(),
                    });
                }
                let index = WeightedIndex::<f64>::new(&weights)
                    .map_err(|err| AnnotationError::InvalidWeights(err.to_string()))?;
                Some(index)
            }
        };
        Ok(Self { variants, weights })
    }

    /// Plain string variants
    pub fn literals<S: Into<String>>(variants: impl IntoIterator<Item = S>, weights: Option<Vec<f64>>) -> Result<Self> {
        Self::new(
            variants.into_iter().map(|v| VariantSpec::Literal(v.into())).collect(),
            weights,
        )
    }

    /// Variant codes derived against each resolved target
    pub fn codes<S: AsRef<str>>(codes: impl IntoIterator<Item = S>, weights: Option<Vec<f64>>) -> Result<Self> {
        Self::new(
            codes
                .into_iter()
                .map(|c| VariantSpec::Code(VariantCode::parse(c.as_ref())))
                .collect(),
            weights,
        )
    }

    pub fn variants(&self) -> &[VariantSpec] {
        &self.variants
    }

    /// Draw one candidate, weighted when weights were given, uniform otherwise
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &VariantSpec {
        match &self.weights {
            Some(index) => &self.variants[index.sample(rng)],
            None => &self.variants[rng.gen_range(0..self.variants.len())],
        }
    }

    /// Draw one candidate and realize it for `target`
    pub fn choose_for<R: Rng + ?Sized>(&self, target: &str, rng: &mut R) -> Result<String> {
        self.choose(rng).realize(target)
    }
}

/// Pick one of `variants`, uniformly or by relative `weights`
pub fn choose_variant<'a, R: Rng + ?Sized>(
    variants: &'a [String],
    weights: Option<&[f64]>,
    rng: &mut R,
) -> Result<&'a str> {
    if variants.is_empty() {
        return Err(AnnotationError::InvalidInput("No variants given.".to_string()));
    }
    match weights {
        None => variants
            .choose(rng)
            .map(String::as_str)
            .ok_or_else(|| AnnotationError::InvalidInput("No variants given.".to_string())),
        Some(weights) => {
            if weights.len() != variants.len() {
                return Err(AnnotationError::WeightMismatch {
                    variants: variants.len(),
                    weights: weights.len(),
                });
            }
            let index = WeightedIndex::<f64>::new(weights)
                .map_err(|err| AnnotationError::InvalidWeights(err.to_string()))?;
            Ok(variants[index.sample(rng)].as_str())
        }
    }
}

/// Derive a variant from a hyphenated code, one segment per target word
pub fn derive_variant_from_code(target: &str, variant_code: &str) -> Result<String> {
    VariantCode::parse(variant_code).derive(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_zero_weight_is_never_chosen() {
        let mut rng = StdRng::seed_from_u64(7);
        let variants = strings(&["a", "b"]);
        for _ in 0..200 {
            assert_eq!(choose_variant(&variants, Some(&[0.0, 1.0]), &mut rng).unwrap(), "b");
        }
    }

    #[test]
    fn test_uniform_choice_covers_all_variants() {
        let mut rng = StdRng::seed_from_u64(42);
        let variants = strings(&["jejich", "jejích", "jejichž"]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..300 {
            seen.insert(choose_variant(&variants, None, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_seeded_choice_is_reproducible() {
        let variants = strings(&["a", "b", "c", "d"]);
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| choose_variant(&variants, Some(&[1.0, 2.0, 3.0, 4.0]), &mut rng).unwrap().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(3), draw(3));
    }

    #[test]
    fn test_weight_mismatch() {
        let mut rng = StdRng::seed_from_u64(1);
        let variants = strings(&["a", "b"]);
        assert_eq!(
            choose_variant(&variants, Some(&[1.0]), &mut rng).unwrap_err(),
            AnnotationError::WeightMismatch { variants: 2, weights: 1 }
        );
        assert!(matches!(
            VariantSet::literals(["a", "b"], Some(vec![1.0, 2.0, 3.0])),
            Err(AnnotationError::WeightMismatch { .. })
        ));
    }

    #[test]
    fn test_unusable_weights() {
        assert!(matches!(
            VariantSet::literals(["a", "b"], Some(vec![0.0, 0.0])),
            Err(AnnotationError::InvalidWeights(_))
        ));
        assert!(matches!(
            VariantSet::literals(["a", "b"], Some(vec![-1.0, 2.0])),
            Err(AnnotationError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_empty_variants() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            choose_variant(&[], None, &mut rng),
            Err(AnnotationError::InvalidInput(_))
        ));
        assert!(VariantSet::literals(Vec::<String>::new(), None).is_err());
    }

    #[test]
    fn test_derive_replaces_leading_characters() {
        assert_eq!(
            derive_variant_from_code("těmi dlouhými rukami", "a-a-a").unwrap(),
            "a aými ai"
        );
        assert_eq!(derive_variant_from_code("zavřenýma očima", "i-i").unwrap(), "inýma i");
    }

    #[test]
    fn test_derive_counts_characters_not_bytes() {
        // "čtyřmi" is six characters but more bytes; only "čtyřm" goes
        assert_eq!(derive_variant_from_code("čtyřmi", "X").unwrap(), "Xi");
    }

    #[test]
    fn test_derive_segment_count_mismatch() {
        let err = derive_variant_from_code("dvě slova", "a").unwrap_err();
        assert_eq!(
            err,
            AnnotationError::SegmentCountMismatch {
                target: "dvě slova".to_string(),
                code: "a".to_string(),
                words: 2,
                segments: 1,
            }
        );
    }

    #[test]
    fn test_variant_set_with_codes() {
        let mut rng = StdRng::seed_from_u64(5);
        let set = VariantSet::codes(["i-i"], None).unwrap();
        assert_eq!(set.choose_for("zavřenýma očima", &mut rng).unwrap(), "inýma i");

        let set = VariantSet::literals(["jejich"], None).unwrap();
        assert_eq!(set.choose_for("jejích", &mut rng).unwrap(), "jejich");
    }
}
