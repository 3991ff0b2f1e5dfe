use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "irr",
    version,
    about = "Inter-rater reliability analysis between LLM and reference codings"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two coding tables and write the agreement report
    Report(ReportArgs),
    /// Build the LLM-side coding table from extracted submission JSON files
    Extract(ExtractArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Coding table produced by the automated extractor (CSV or XLSX)
    #[arg(long)]
    pub llm_data: PathBuf,

    /// Coding table exported by the reference tool (CSV or XLSX)
    #[arg(long)]
    pub reference_data: PathBuf,

    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// JSON category schema overriding the built-in rubric
    #[arg(long)]
    pub schema_path: Option<PathBuf>,

    /// JSON key map overriding the built-in document-key remapping
    #[arg(long)]
    pub key_map_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Directory of extracted submission JSON files
    #[arg(long)]
    pub json_dir: PathBuf,

    #[arg(long, default_value = "output/llm_coding_table.csv")]
    pub output_path: PathBuf,
}
