// WHY: Typographic clean-up of corpus text, expressed as an ordered rule table
// Order matters: the ellipsis rule feeds the closing-punctuation rule, the dash rules need
// collapsed spaces, and the quote rules run last on already-tightened text

use std::sync::OnceLock;

use crate::error::Result;
use crate::rewrite::RewriteRule;

/// Ordered (name, pattern, replacement) table applied by [`PunctuationNormalizer`]
pub const PUNCTUATION_RULES: &[(&str, &str, &str)] = &[
    ("three-dots-to-ellipsis", r"\.\.\.", "…"),
    ("collapse-double-space", "  ", " "),
    ("clitic-li", " - li", " -li"),
    ("spaced-hyphen-to-dash", " - ", " – "),
    ("no-space-before-closing", r"\s+([.,\]}?!:;“…)+¨«‘])", "$1"),
    ("no-space-after-opening", r"([„\[{(»°+‚])\s+", "$1"),
    ("closing-double-quote", r#""([ $,.?!])"#, "“$1"),
    ("opening-double-quote", r#" ""#, " „"),
];

/// Compiled punctuation rule table
#[derive(Debug)]
pub struct PunctuationNormalizer {
    rules: Vec<RewriteRule>,
}

impl PunctuationNormalizer {
    pub fn new() -> Result<Self> {
        let rules = PUNCTUATION_RULES
            .iter()
            .map(|&(name, pattern, replacement)| RewriteRule::new(name, pattern, replacement))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Run every rule over the text in table order
    pub fn normalize(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |current, rule| rule.apply(&current))
    }
}

fn shared_normalizer() -> &'static PunctuationNormalizer {
    static NORMALIZER: OnceLock<PunctuationNormalizer> = OnceLock::new();
    NORMALIZER.get_or_init(|| {
        PunctuationNormalizer::new().expect("built-in punctuation rules are valid patterns")
    })
}

/// Normalize punctuation with the built-in rule table
pub fn normalize(text: &str) -> String {
    shared_normalizer().normalize(text)
}
