// WHY: Public helpers for the annotation text files written by the CLI and read back by checks
// One annotated sentence per line, appended across runs

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::annotation::Annotation;

/// Prefix shared by every annotation data file
pub const DATA_FILE_PREFIX: &str = "data_zajmena_";

/// Generate annotation file path for an output name
pub fn annotation_file_path<P: AsRef<Path>>(files_dir: P, name: &str) -> PathBuf {
    files_dir.as_ref().join(format!("{DATA_FILE_PREFIX}{name}.txt"))
}

/// Append sentences to the file, creating it and its directory when missing
///
/// # Example
/// ```no_run
/// use concordance_annotator::output::{annotation_file_path, append_annotations};
/// let path = annotation_file_path("files", "jejich");
/// append_annotations(&path, &["Stál před [*jejích|jejich|corpus*] chalupou.".to_string()]).unwrap();
/// ```
pub fn append_annotations<P: AsRef<Path>>(path: P, sentences: &[String]) -> io::Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for sentence in sentences {
        writeln!(file, "{sentence}")?;
    }
    Ok(sentences.len())
}

/// Split lines into first occurrences and repeated ones, keeping order.
/// Blank lines are never treated as duplicates.
pub fn find_duplicates<S: AsRef<str>>(lines: &[S]) -> (Vec<String>, Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::with_capacity(lines.len());
    let mut duplicates = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if !line.trim().is_empty() && !seen.insert(line.to_string()) {
            duplicates.push(line.to_string());
        } else {
            unique.push(line.to_string());
        }
    }
    (unique, duplicates)
}

/// Rewrite the file without repeated lines and return what was removed
pub fn remove_duplicates<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path.as_ref())?;
    let lines: Vec<&str> = content.lines().collect();
    let (unique, duplicates) = find_duplicates(&lines);

    let mut rewritten = unique.join("\n");
    if !unique.is_empty() {
        rewritten.push('\n');
    }
    fs::write(path.as_ref(), rewritten)?;
    Ok(duplicates)
}

/// Occurrences of each annotation span (lowercased) in an annotation file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationCounts {
    pub counts: BTreeMap<String, usize>,
    pub total: usize,
}

/// Count the first annotation span of every line
pub fn count_annotations<P: AsRef<Path>>(path: P) -> io::Result<AnnotationCounts> {
    let content = fs::read_to_string(path)?;
    let mut result = AnnotationCounts::default();

    for line in content.lines() {
        if let Some(span) = Annotation::spans(line).first() {
            *result.counts.entry(span.to_lowercase()).or_insert(0) += 1;
            result.total += 1;
        }
    }
    Ok(result)
}
