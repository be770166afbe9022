// WHY: One TOML file describes one annotation job so runs can be repeated and logged
// Paths inside the file are relative to the file itself

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::annotation::Provenance;
use crate::corpus::{CorpusManager, ExportFile};
use crate::pipeline::AnnotationPipeline;
use crate::query_log::QueryEntry;
use crate::target::TargetSpec;
use crate::variant::VariantSet;

/// Output directory used when neither the CLI nor the environment names one
pub const DEFAULT_FILES_DIR: &str = "files";

/// Environment variable overriding the output directory
pub const FILES_DIR_ENV: &str = "ANNOTATION_FILES_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Output name, used for `data_zajmena_<name>.txt` and `README_<name>.json`
    pub name: String,
    #[serde(default)]
    pub corpus_manager: CorpusManager,
    pub corpus_name: String,
    /// Query text as sent to the corpus manager, only logged
    #[serde(default)]
    pub query: String,
    /// Saved corpus manager response holding the concordances
    pub export: PathBuf,
    /// Literal target word or phrase
    #[serde(default)]
    pub target: Option<String>,
    /// Target code such as `mi-mi`
    #[serde(default)]
    pub target_code: Option<String>,
    pub variants: Vec<String>,
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
    #[serde(default)]
    pub variants_are_codes: bool,
    pub is_target_valid: bool,
    #[serde(default)]
    pub provenance: Provenance,
    /// Count written to the query log; defaults to the number of concordances read
    #[serde(default)]
    pub number_of_concordances: Option<u64>,
}

impl JobConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid job configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read a job file and anchor its relative export path at the file's directory
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        let mut config = Self::from_toml(&content)?;
        if config.export.is_relative() {
            if let Some(parent) = path.parent() {
                config.export = parent.join(&config.export);
            }
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Job name must not be empty");
        }
        if self.variants.is_empty() {
            bail!("Job '{}' lists no variants", self.name);
        }
        match (&self.target, &self.target_code) {
            (Some(_), Some(_)) => bail!("Job '{}' sets both target and target_code", self.name),
            (None, None) => bail!("Job '{}' sets neither target nor target_code", self.name),
            _ => Ok(()),
        }
    }

    pub fn target_spec(&self) -> Result<TargetSpec> {
        match (&self.target, &self.target_code) {
            (Some(literal), None) => Ok(TargetSpec::literal(literal.trim())),
            (None, Some(code)) => Ok(TargetSpec::code(code)?),
            _ => bail!("Job '{}' needs exactly one of target and target_code", self.name),
        }
    }

    pub fn variant_set(&self) -> Result<VariantSet> {
        let set = if self.variants_are_codes {
            VariantSet::codes(&self.variants, self.weights.clone())?
        } else {
            VariantSet::literals(self.variants.iter().cloned(), self.weights.clone())?
        };
        Ok(set)
    }

    pub fn build_pipeline(&self) -> Result<AnnotationPipeline> {
        Ok(AnnotationPipeline::new(
            self.target_spec()?,
            self.variant_set()?,
            self.is_target_valid,
            self.provenance,
        )?)
    }

    pub fn source(&self) -> ExportFile {
        ExportFile::new(&self.export, self.corpus_manager, self.corpus_name.clone())
    }

    /// Query log entry for this job; `read` is used when no count was configured
    pub fn query_entry(&self, read: u64) -> QueryEntry {
        let target = self
            .target
            .as_deref()
            .or(self.target_code.as_deref())
            .unwrap_or_default();
        QueryEntry::new(
            &self.corpus_name,
            &self.query,
            self.number_of_concordances.unwrap_or(read),
            target,
            &self.variants,
            self.is_target_valid,
        )
    }
}

/// Pick the output directory: explicit choice first, then the environment, then the default
pub fn resolve_files_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(FILES_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILES_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_log::LookingFor;

    const JOB: &str = r#"
name = "jejich"
corpus_manager = "sketch"
corpus_name = "cstenten23_mj2"
query = '[word="jejích"]'
export = "jejich.json"
target = "jejích"
variants = ["jejich"]
is_target_valid = false
provenance = "corpus"
"#;

    #[test]
    fn test_parse_literal_job() {
        let config = JobConfig::from_toml(JOB).unwrap();
        assert_eq!(config.corpus_manager, CorpusManager::Sketch);
        assert_eq!(config.provenance, Provenance::Corpus);
        assert!(!config.variants_are_codes);
        assert_eq!(config.target_spec().unwrap(), TargetSpec::literal("jejích"));
        assert!(config.build_pipeline().is_ok());
    }

    #[test]
    fn test_code_job_with_weights() {
        let job = r#"
name = "mi"
corpus_name = "syn2020"
export = "/data/mi.json"
target_code = "mi-mi"
variants = ["ma-ma", "my-my"]
weights = [0.7, 0.3]
variants_are_codes = true
is_target_valid = true
provenance = "synthetic"
"#;
        let config = JobConfig::from_toml(job).unwrap();
        assert_eq!(config.corpus_manager, CorpusManager::Kontext);
        assert!(matches!(config.target_spec().unwrap(), TargetSpec::Code(_)));
        assert_eq!(config.variant_set().unwrap().variants().len(), 2);
    }

    #[test]
    fn test_target_choice_is_validated() {
        let both = JOB.replace("target = \"jejích\"", "target = \"jejích\"\ntarget_code = \"ích\"");
        assert!(JobConfig::from_toml(&both).is_err());
        let neither = JOB.replace("target = \"jejích\"", "");
        assert!(JobConfig::from_toml(&neither).is_err());
        let no_variants = JOB.replace("variants = [\"jejich\"]", "variants = []");
        assert!(JobConfig::from_toml(&no_variants).is_err());
    }

    #[test]
    fn test_weight_mismatch_surfaces_when_building() {
        let job = JOB.replace("variants = [\"jejich\"]", "variants = [\"jejich\"]\nweights = [0.5, 0.5]");
        let config = JobConfig::from_toml(&job).unwrap();
        assert!(config.build_pipeline().is_err());
    }

    #[test]
    fn test_query_entry_uses_read_count_by_default() {
        let config = JobConfig::from_toml(JOB).unwrap();
        let entry = config.query_entry(12);
        assert_eq!(entry.number_of_concordances, 12);
        assert_eq!(entry.is_looking_for, Some(LookingFor::Error));
        assert_eq!(entry.error, vec!["jejích"]);

        let fixed = JobConfig {
            number_of_concordances: Some(500),
            ..config
        };
        assert_eq!(fixed.query_entry(12).number_of_concordances, 500);
    }

    #[tokio::test]
    async fn test_load_anchors_export_path() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let job_path = temp_dir.path().join("job.toml");
        std::fs::write(&job_path, JOB).unwrap();
        let config = JobConfig::load(&job_path).await.unwrap();
        assert_eq!(config.export, temp_dir.path().join("jejich.json"));
    }

    #[test]
    fn test_explicit_files_dir_wins() {
        assert_eq!(resolve_files_dir(Some(PathBuf::from("out"))), PathBuf::from("out"));
    }
}
