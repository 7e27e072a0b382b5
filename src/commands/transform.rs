// src/commands/transform.rs
//! `patchwork transform`

use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use patchwork::transform::{transform_batch_with, ArchiveJob, ArchiveReport, DuplicatePolicy};
use patchwork::PatchworkConfig;
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Command line values that override the config file
pub struct TransformArgs {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub format: OutputFormat,
    pub reject_duplicate_mods: bool,
    pub isolate_class_failures: bool,
    pub keep_signatures: bool,
}

/// Transform every input jar into the output directory
pub fn cmd_transform(args: TransformArgs, config: &PatchworkConfig) -> Result<()> {
    let mut options = config.transform_options();
    if args.reject_duplicate_mods {
        options.duplicate_mod_identity = DuplicatePolicy::Reject;
    }
    options.isolate_class_failures |= args.isolate_class_failures;
    if args.keep_signatures {
        options.strip_signatures = false;
    }

    let output_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    let jobs = plan_jobs(&collect_jars(&args.inputs)?, &output_dir)?;
    if jobs.is_empty() {
        println!("No jar files found");
        return Ok(());
    }

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let threads = match args.jobs.or(config.jobs) {
        Some(0) => bail!("--jobs must be at least 1"),
        Some(n) => n,
        None => 0,
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to start worker pool")?;

    info!("Transforming {} archive(s) into {}", jobs.len(), output_dir.display());

    let progress = match args.format {
        OutputFormat::Text => create_progress_bar(jobs.len() as u64),
        OutputFormat::Json => ProgressBar::hidden(),
    };
    let reports = pool.install(|| {
        transform_batch_with(&jobs, &options, |report| {
            progress.inc(1);
            progress.set_message(display_name(&report.job.source));
        })
    });
    progress.finish_and_clear();

    match args.format {
        OutputFormat::Text => print_text(&reports),
        OutputFormat::Json => {
            let values: Vec<_> = reports.iter().map(report_json).collect();
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
    }

    let failed = reports.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        bail!("{} of {} archive(s) failed", failed, reports.len());
    }
    Ok(())
}

/// Expand directories into the jars they contain, in a stable order
fn collect_jars(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut jars = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input).follow_links(true) {
                let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
                if entry.file_type().is_file() && is_jar(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            jars.extend(found);
        } else if input.is_file() {
            jars.push(input.clone());
        } else {
            bail!("Input not found: {}", input.display());
        }
    }
    Ok(jars)
}

fn is_jar(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jar"))
}

/// Pair each jar with its destination; two inputs may not share a file name
fn plan_jobs(jars: &[PathBuf], output_dir: &Path) -> Result<Vec<ArchiveJob>> {
    let mut seen: HashMap<&std::ffi::OsStr, &Path> = HashMap::new();
    let mut jobs = Vec::with_capacity(jars.len());
    for jar in jars {
        let file_name = jar
            .file_name()
            .with_context(|| format!("Not a file: {}", jar.display()))?;
        if let Some(previous) = seen.insert(file_name, jar.as_path()) {
            bail!(
                "{} and {} would both be written to {}",
                previous.display(),
                jar.display(),
                output_dir.join(file_name).display()
            );
        }
        jobs.push(ArchiveJob::new(jar.clone(), output_dir.join(file_name)));
    }
    Ok(jobs)
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} ({pos}/{len}) [{bar:40.green/dim}] {percent}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("Transforming");
    pb
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_text(reports: &[ArchiveReport]) {
    for report in reports {
        let source = report.job.source.display();
        match &report.outcome {
            Ok(result) => {
                let mod_id = result
                    .mod_identity
                    .as_ref()
                    .map(|m| m.declared_id.as_str())
                    .unwrap_or("?");
                println!(
                    "  [OK] {} -> {} (mod '{}', {} shim(s))",
                    source,
                    report.job.destination.display(),
                    mod_id,
                    result.generated.len()
                );
                for diagnostic in &result.diagnostics {
                    println!("       [SKIPPED] {}", diagnostic);
                }
            }
            Err(e) => println!("  [FAILED] {}: {}", source, e),
        }
    }
}

fn report_json(report: &ArchiveReport) -> serde_json::Value {
    match &report.outcome {
        Ok(result) => json!({
            "source": report.job.source,
            "destination": report.job.destination,
            "status": "ok",
            "result": result,
        }),
        Err(e) => json!({
            "source": report.job.source,
            "status": "failed",
            "kind": e.kind(),
            "unit": e.unit(),
            "error": e.to_string(),
        }),
    }
}
