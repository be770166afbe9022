// WHY: Boundary to the corpus managers. Hits arrive as left context, match and right context
// and are joined into one concordance string before entering the pipeline

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Corpus manager a query result came from; they shape their JSON slightly differently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorpusManager {
    /// KonText: every context side carries a single token run
    #[default]
    Kontext,
    /// Sketch Engine: every context side is a list of token runs and structure tags
    Sketch,
}

impl fmt::Display for CorpusManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusManager::Kontext => f.write_str("kontext"),
            CorpusManager::Sketch => f.write_str("sketch"),
        }
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusHit {
    pub left: String,
    pub kwic: String,
    pub right: String,
}

impl CorpusHit {
    pub fn new(left: impl Into<String>, kwic: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            kwic: kwic.into(),
            right: right.into(),
        }
    }

    /// Join the three fragments with single spaces
    pub fn to_concordance(&self) -> String {
        format!("{} {} {}", self.left, self.kwic, self.right)
    }
}

/// Anything that can hand over concordances for an annotation run
pub trait ConcordanceSource {
    fn concordances(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct ExportResponse {
    #[serde(rename = "Lines", default)]
    lines: Vec<ExportLine>,
}

#[derive(Debug, Deserialize)]
struct ExportLine {
    #[serde(rename = "Left", default)]
    left: Vec<ExportToken>,
    #[serde(rename = "Kwic", default)]
    kwic: Vec<ExportToken>,
    #[serde(rename = "Right", default)]
    right: Vec<ExportToken>,
}

#[derive(Debug, Deserialize)]
struct ExportToken {
    #[serde(rename = "str")]
    text: Option<String>,
}

fn join_tokens(tokens: &[ExportToken], manager: CorpusManager) -> String {
    match manager {
        CorpusManager::Kontext => tokens
            .first()
            .and_then(|token| token.text.clone())
            .unwrap_or_default(),
        CorpusManager::Sketch => tokens
            .iter()
            .filter_map(|token| token.text.as_deref())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Parse a saved query response into hits
pub fn parse_export(json: &str, manager: CorpusManager, corpus_name: &str) -> Result<Vec<CorpusHit>> {
    let response: ExportResponse = serde_json::from_str(json)
        .with_context(|| format!("Invalid {manager} response for corpus '{corpus_name}'"))?;

    if response.lines.is_empty() {
        bail!(
            "No concordances found in: manager: '{}', corpus: '{}'. (Are you sure that you used correct tagging system?)",
            manager,
            corpus_name
        );
    }

    let hits: Vec<CorpusHit> = response
        .lines
        .iter()
        .map(|line| CorpusHit {
            left: join_tokens(&line.left, manager),
            kwic: join_tokens(&line.kwic, manager),
            right: join_tokens(&line.right, manager),
        })
        .collect();
    debug!("Parsed {} hits from {} response", hits.len(), manager);
    Ok(hits)
}

/// A query response saved to disk
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub path: PathBuf,
    pub manager: CorpusManager,
    pub corpus_name: String,
}

impl ExportFile {
    pub fn new(path: impl AsRef<Path>, manager: CorpusManager, corpus_name: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            manager,
            corpus_name: corpus_name.into(),
        }
    }

    pub fn hits(&self) -> Result<Vec<CorpusHit>> {
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read corpus export {}", self.path.display()))?;
        parse_export(&json, self.manager, &self.corpus_name)
    }
}

impl ConcordanceSource for ExportFile {
    fn concordances(&self) -> Result<Vec<String>> {
        let concordances: Vec<String> = self.hits()?.iter().map(CorpusHit::to_concordance).collect();
        info!(
            "Loaded {} concordances from {}",
            concordances.len(),
            self.path.display()
        );
        Ok(concordances)
    }
}
