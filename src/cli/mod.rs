// src/cli/mod.rs
//! CLI definitions for patchwork
//!
//! Only argument parsing lives here; the handlers are in the `commands`
//! module.
//!
//! - `transform` - Convert Forge mod jars into Fabric mods
//! - `scan` - Report the capabilities a jar declares
//! - `completions` - Shell completion scripts

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "patchwork")]
#[command(author = "Patchwork Contributors")]
#[command(version)]
#[command(about = "Convert Forge mod jars into Fabric mods", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./patchwork.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert Forge mod jars into Fabric mods
    Transform {
        /// Jar files, or directories searched recursively for jars
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: output_dir from the config file)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Number of archives to transform in parallel
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Fail an archive that has more than one @Mod class
        #[arg(long)]
        reject_duplicate_mods: bool,

        /// Copy classes that fail to parse through unchanged
        #[arg(long)]
        isolate_class_failures: bool,

        /// Keep jar signature files
        #[arg(long)]
        keep_signatures: bool,
    },

    /// Report the capabilities a jar declares without writing anything
    Scan {
        /// Jar file to scan
        input: PathBuf,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
