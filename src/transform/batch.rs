// src/transform/batch.rs
//! Parallel batch driver
//!
//! Each archive is an independent job with its own accumulator and
//! destination. A failing archive is reported and never stops the others.

use super::{ArchiveTransformer, ModTransformationResult, TransformError, TransformOptions};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};

/// One archive to transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveJob {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl ArchiveJob {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Outcome of one job
#[derive(Debug)]
pub struct ArchiveReport {
    pub job: ArchiveJob,
    pub outcome: Result<ModTransformationResult, TransformError>,
}

impl ArchiveReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Transform every job on the rayon pool; reports come back in job order
pub fn transform_batch(jobs: &[ArchiveJob], options: &TransformOptions) -> Vec<ArchiveReport> {
    transform_batch_with(jobs, options, |_| {})
}

/// Like [`transform_batch`], calling `on_done` as each job finishes
pub fn transform_batch_with<F>(jobs: &[ArchiveJob], options: &TransformOptions, on_done: F) -> Vec<ArchiveReport>
where
    F: Fn(&ArchiveReport) + Sync,
{
    let transformer = ArchiveTransformer::with_options(options.clone());

    let reports: Vec<ArchiveReport> = jobs
        .par_iter()
        .map(|job| {
            let outcome = transformer.transform(&job.source, &job.destination);
            if let Err(e) = &outcome {
                warn!("Failed to transform {}: {}", job.source.display(), e);
            }
            let report = ArchiveReport {
                job: job.clone(),
                outcome,
            };
            on_done(&report);
            report
        })
        .collect();

    let failed = reports.iter().filter(|r| !r.is_success()).count();
    info!(
        "Batch finished: {} succeeded, {} failed",
        reports.len() - failed,
        failed
    );
    reports
}
