use std::path::PathBuf;

use clap::Parser;
use fwdiff_sdk::{DigestAlgorithm, TypeConflictPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "fwdiff",
    about = "Compare two firmware packages by extracting them and diffing their contents",
    version,
)]
pub struct Cli {
    /// Path to the first firmware package
    pub file1: PathBuf,

    /// Path to the second firmware package
    pub file2: PathBuf,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Extraction tool to run instead of the configured one
    #[arg(long)]
    pub tool: Option<String>,

    /// Content digest: sha256 or blake3
    #[arg(long)]
    pub algorithm: Option<DigestAlgorithm>,

    /// What to do when a path is a file on one side and a directory on the other: changed or error
    #[arg(long)]
    pub on_type_conflict: Option<TypeConflictPolicy>,

    /// List every file inside directories present on one side only
    #[arg(long)]
    pub expand: bool,

    #[arg(long)]
    pub no_color: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
