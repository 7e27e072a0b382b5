// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: report format
fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_parser(["text", "json"])
        .default_value("text")
        .help("Report format")
}

fn build_cli() -> Command {
    Command::new("patchwork")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Patchwork Contributors")
        .about("Convert Forge mod jars into Fabric mods")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Configuration file (default: ./patchwork.toml when present)"),
        )
        .arg(
            Arg::new("no_color")
                .long("no-color")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Disable colored log output"),
        )
        .subcommand(
            Command::new("transform")
                .about("Convert Forge mod jars into Fabric mods")
                .arg(
                    Arg::new("inputs")
                        .required(true)
                        .num_args(1..)
                        .help("Jar files, or directories searched recursively for jars"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("DIR")
                        .help("Output directory"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Number of archives to transform in parallel"),
                )
                .arg(format_arg())
                .arg(
                    Arg::new("reject_duplicate_mods")
                        .long("reject-duplicate-mods")
                        .action(ArgAction::SetTrue)
                        .help("Fail an archive that has more than one @Mod class"),
                )
                .arg(
                    Arg::new("isolate_class_failures")
                        .long("isolate-class-failures")
                        .action(ArgAction::SetTrue)
                        .help("Copy classes that fail to parse through unchanged"),
                )
                .arg(
                    Arg::new("keep_signatures")
                        .long("keep-signatures")
                        .action(ArgAction::SetTrue)
                        .help("Keep jar signature files"),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("Report the capabilities a jar declares without writing anything")
                .arg(Arg::new("input").required(true).help("Jar file to scan"))
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("patchwork.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
