// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use commands::TransformArgs;
use patchwork::PatchworkConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = PatchworkConfig::discover(cli.config.as_deref())?;

    // Logs go to stderr so `--format json` output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(config.color && !cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Transform {
            inputs,
            output,
            jobs,
            format,
            reject_duplicate_mods,
            isolate_class_failures,
            keep_signatures,
        } => commands::cmd_transform(
            TransformArgs {
                inputs,
                output,
                jobs,
                format,
                reject_duplicate_mods,
                isolate_class_failures,
                keep_signatures,
            },
            &config,
        ),
        Commands::Scan { input, format } => commands::cmd_scan(&input, format, &config),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "patchwork", &mut std::io::stdout());
            Ok(())
        }
    }
}
