use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Which side of the annotation the corpus query was looking for
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LookingFor {
    Correct,
    Error,
}

impl LookingFor {
    fn as_str(&self) -> &'static str {
        match self {
            LookingFor::Correct => "correct",
            LookingFor::Error => "error",
        }
    }
}

/// Metadata of one corpus query that fed an annotation file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueryEntry {
    #[serde(default)]
    pub query: String,
    #[serde(default, alias = "corpora_name")]
    pub corpus_name: Option<String>,
    #[serde(default)]
    pub number_of_concordances: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_looking_for: Option<LookingFor>,
    #[serde(default)]
    pub correct: Vec<String>,
    #[serde(default)]
    pub error: Vec<String>,
}

impl QueryEntry {
    /// The target lands on the correct side when it is valid, variants on the other
    pub fn new(
        corpus_name: &str,
        query: &str,
        number_of_concordances: u64,
        target: &str,
        variants: &[String],
        is_target_valid: bool,
    ) -> Self {
        let (correct, error, looking_for) = if is_target_valid {
            (vec![target.to_string()], variants.to_vec(), LookingFor::Correct)
        } else {
            (variants.to_vec(), vec![target.to_string()], LookingFor::Error)
        };
        Self {
            query: query.to_string(),
            corpus_name: Some(corpus_name.to_string()),
            number_of_concordances,
            is_looking_for: Some(looking_for),
            correct,
            error,
        }
    }
}

/// JSON query log kept next to every annotation file
/// WHY: Records how each batch of sentences was obtained so the data set can be rebuilt
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct QueryLog {
    #[serde(default)]
    pub queries: Vec<QueryEntry>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl QueryLog {
    /// Path of the JSON log for an output name
    pub fn path(files_dir: &Path, name: &str) -> PathBuf {
        files_dir.join(format!("README_{name}.json"))
    }

    /// Load the log, or start an empty one when the file does not exist yet
    pub async fn load(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            info!("File {} does not exist, starting a new query log.", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(path, content).await?;
        Ok(())
    }

    /// Append an entry and persist the log in one step
    pub async fn append(path: &Path, entry: QueryEntry) -> Result<Self> {
        let mut log = Self::load(path).await?;
        log.queries.push(entry);
        log.save(path).await?;
        Ok(log)
    }

    /// Logged concordance counts per first correct form, plus their total
    pub fn correct_counts(&self) -> (BTreeMap<String, u64>, u64) {
        let mut counter = BTreeMap::new();
        for entry in &self.queries {
            let Some(correct) = entry.correct.first() else {
                continue;
            };
            *counter.entry(correct.clone()).or_insert(0) += entry.number_of_concordances;
        }
        let total = counter.values().sum();
        (counter, total)
    }

    /// Markdown table merging entries with the same query text across corpora
    pub fn summary_lines(&self) -> Vec<String> {
        let mut merged: Vec<(String, MergedQuery)> = Vec::new();

        for entry in &self.queries {
            let query = entry.query.replace('\n', " ").trim().to_string();
            let position = match merged.iter().position(|(q, _)| *q == query) {
                Some(position) => position,
                None => {
                    merged.push((query, MergedQuery::default()));
                    merged.len() - 1
                }
            };
            let details = &mut merged[position].1;
            details.corpora.push((
                entry.corpus_name.clone().unwrap_or_else(|| "N/A".to_string()),
                entry.number_of_concordances,
            ));
            details.correct.extend(entry.correct.iter().cloned());
            details.error.extend(entry.error.iter().cloned());
            details.targets.insert(
                entry
                    .is_looking_for
                    .map(|l| l.as_str().to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
            );
        }

        let rows: Vec<[String; 5]> = merged
            .into_iter()
            .map(|(query, mut details)| {
                details.corpora.sort_by(|a, b| b.1.cmp(&a.1));
                let corpora = details
                    .corpora
                    .iter()
                    .map(|(name, hits)| format!("{name} ({hits})"))
                    .collect::<Vec<_>>()
                    .join(", ");
                [
                    query,
                    corpora,
                    format!("*{}*", join_or_na(&details.correct)),
                    format!("*{}*", join_or_na(&details.error)),
                    join_or_na(&details.targets),
                ]
            })
            .collect();

        let headers = ["Query", "Corpora (Hits)", "Correct Form", "Frequent Errors", "Target Type"];
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let render = |cells: Vec<&str>| -> String {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let mut lines = vec![render(headers.to_vec())];
        let separator: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        lines.push(format!("|-{}-|", separator.join("-|-")));
        for row in &rows {
            lines.push(render(row.iter().map(String::as_str).collect()));
        }
        lines
    }

    /// Write comments and the summary table to the `.txt` sibling of the JSON log
    pub async fn write_text_readme(&self, json_path: &Path) -> Result<PathBuf> {
        let txt_path = json_path.with_extension("txt");
        let mut content = String::new();
        for comment in &self.comments {
            content.push_str(comment);
            content.push('\n');
        }
        content.push('\n');
        for line in self.summary_lines() {
            content.push_str(&line);
            content.push('\n');
        }
        fs::write(&txt_path, content).await?;
        info!("Summary successfully written to {}.", txt_path.display());
        Ok(txt_path)
    }
}

#[derive(Debug, Default)]
struct MergedQuery {
    corpora: Vec<(String, u64)>,
    correct: BTreeSet<String>,
    error: BTreeSet<String>,
    targets: BTreeSet<String>,
}

fn join_or_na(items: &BTreeSet<String>) -> String {
    if items.is_empty() {
        "N/A".to_string()
    } else {
        items.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
