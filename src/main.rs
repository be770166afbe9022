use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use concordance_annotator::config::{resolve_files_dir, JobConfig};
use concordance_annotator::{
    annotation_file_path, append_annotations, count_annotations, remove_duplicates, ConcordanceSource,
    QueryLog,
};

#[derive(Parser, Debug)]
#[command(name = "concordance-annotator")]
#[command(about = "Turns corpus concordances into sentences with inline error annotations")]
#[command(version)]
struct Args {
    /// Directory holding data_zajmena_<name>.txt and README_<name>.json files
    #[arg(long, global = true)]
    files_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotate the concordances of a job and append them to its data file
    Annotate {
        /// TOML job description
        job: PathBuf,

        /// Seed for variant selection, for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Print annotated sentences instead of writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove duplicate sentences and report annotation counts
    Check {
        /// Output name used by the job
        name: String,
    },
    /// Write the Markdown summary of a query log
    Summary {
        /// Output name used by the job
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logging keeps skipped concordances greppable after long runs
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    let files_dir = resolve_files_dir(args.files_dir);

    match args.command {
        Command::Annotate { job, seed, dry_run } => annotate(&job, &files_dir, seed, dry_run).await,
        Command::Check { name } => check(&files_dir, &name).await,
        Command::Summary { name } => summary(&files_dir, &name).await,
    }
}

async fn annotate(job_path: &Path, files_dir: &Path, seed: Option<u64>, dry_run: bool) -> Result<()> {
    let job = JobConfig::load(job_path).await?;
    info!("Loaded job '{}' from {}", job.name, job_path.display());

    let pipeline = job.build_pipeline()?;
    let concordances = job.source().concordances()?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = pipeline.annotate_batch(&concordances, &mut rng);

    if dry_run {
        for sentence in &report.annotated {
            println!("{sentence}");
        }
        return Ok(());
    }

    let data_path = annotation_file_path(files_dir, &job.name);
    let written = append_annotations(&data_path, &report.annotated)?;
    let duplicates = remove_duplicates(&data_path)?;
    if !duplicates.is_empty() {
        warn!("Removed {} duplicate sentences from {}", duplicates.len(), data_path.display());
    }

    let log_path = QueryLog::path(files_dir, &job.name);
    QueryLog::append(&log_path, job.query_entry(concordances.len() as u64)).await?;

    println!("concordance-annotator v{} - job '{}' complete", env!("CARGO_PKG_VERSION"), job.name);
    println!("  Concordances read: {}", concordances.len());
    println!("  Sentences written: {written}");
    println!("  Skipped: {}", report.skipped.len());
    println!("  Duplicates removed: {}", duplicates.len());
    println!("  Data file: {}", data_path.display());
    Ok(())
}

async fn check(files_dir: &Path, name: &str) -> Result<()> {
    let data_path = annotation_file_path(files_dir, name);
    if !data_path.exists() {
        anyhow::bail!("Annotation file does not exist: {}", data_path.display());
    }

    let duplicates = remove_duplicates(&data_path)?;
    for duplicate in &duplicates {
        println!("duplicate: {duplicate}");
    }
    println!("Removed {} duplicates", duplicates.len());

    let counts = count_annotations(&data_path)?;
    for (span, count) in &counts.counts {
        println!("{count:>6}  {span}");
    }
    println!("Annotations in file: {}", counts.total);

    let log = QueryLog::load(&QueryLog::path(files_dir, name)).await?;
    let (correct, total) = log.correct_counts();
    for (form, count) in &correct {
        println!("{count:>6}  {form}");
    }
    println!("Concordances logged: {total}");
    Ok(())
}

async fn summary(files_dir: &Path, name: &str) -> Result<()> {
    let log_path = QueryLog::path(files_dir, name);
    if !log_path.exists() {
        anyhow::bail!("Query log does not exist: {}", log_path.display());
    }
    let log = QueryLog::load(&log_path).await?;
    let txt_path = log.write_text_readme(&log_path).await?;
    println!("Summary written to {}", txt_path.display());
    Ok(())
}
