// src/commands/scan.rs
//! `patchwork scan`

use super::describe;
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use patchwork::transform::ArchiveTransformer;
use patchwork::PatchworkConfig;
use std::path::Path;
use tracing::info;

/// Print what each class of a jar declares
pub fn cmd_scan(input: &Path, format: OutputFormat, config: &PatchworkConfig) -> Result<()> {
    info!("Scanning {}", input.display());
    let transformer = ArchiveTransformer::with_options(config.transform_options());
    let units = transformer
        .scan(input)
        .with_context(|| format!("Failed to scan {}", input.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&units)?),
        OutputFormat::Text => {
            if units.is_empty() {
                println!("No Forge capabilities found in {}", input.display());
                return Ok(());
            }
            for unit in &units {
                println!("{} ({} access change(s))", unit.unit, unit.access_transformations);
                for capability in &unit.capabilities {
                    println!("  {}", describe(capability));
                }
                for diagnostic in &unit.diagnostics {
                    println!("  [SKIPPED] {}", diagnostic.message);
                }
            }
        }
    }
    Ok(())
}
