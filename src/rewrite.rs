// WHY: Shared regex plumbing so every text transformation is an auditable rule table
// Built on regex-automata's meta engine, same as the sentence detector

use regex_automata::meta::Regex;

use crate::error::Result;

/// A single ordered substitution: every non-overlapping match of `pattern` is replaced by
/// `replacement`, which may refer to capture groups as `$1`, `$2`, ...
#[derive(Debug)]
pub struct RewriteRule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub replacement: &'static str,
    regex: Regex,
}

impl RewriteRule {
    pub fn new(name: &'static str, pattern: &'static str, replacement: &'static str) -> Result<Self> {
        Ok(Self {
            name,
            pattern,
            replacement,
            regex: Regex::new(pattern)?,
        })
    }

    /// Apply the rule to the whole text
    pub fn apply(&self, text: &str) -> String {
        replace_all(&self.regex, text, self.replacement)
    }
}

/// Replace every non-overlapping match, left to right
pub fn replace_all(regex: &Regex, text: &str, replacement: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for caps in regex.captures_iter(text) {
        let Some(mat) = caps.get_match() else {
            continue;
        };
        result.push_str(&text[last_end..mat.start()]);
        caps.interpolate_string_into(text, replacement, &mut result);
        last_end = mat.end();
    }

    result.push_str(&text[last_end..]);
    result
}

/// Replace the leftmost match only. Returns `None` when nothing matched.
pub fn replace_first(regex: &Regex, text: &str, replacement: &str) -> Option<String> {
    let caps = regex.captures_iter(text).next()?;
    let mat = caps.get_match()?;

    let mut result = String::with_capacity(text.len() + replacement.len());
    result.push_str(&text[..mat.start()]);
    caps.interpolate_string_into(text, replacement, &mut result);
    result.push_str(&text[mat.end()..]);
    Some(result)
}

/// Quote a literal so it matches itself inside a larger pattern
pub fn escape(literal: &str) -> String {
    regex_syntax::escape(literal)
}

/// Escape `$` so a literal survives capture-group interpolation unchanged
pub fn escape_replacement(literal: &str) -> String {
    literal.replace('$', "$$")
}
