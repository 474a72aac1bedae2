//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Phenosift: pre-import checks for tabular trait data files
#[derive(Parser)]
#[command(name = "phenosift")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run all configured checks against a trait data file
    Check {
        /// Path to the data file (TSV/CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Import configuration file (JSON); defaults cover a plain TSV
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Store seed file (JSON) with known genera, projects and
        /// committed trait combinations
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Genus the import is bound to (overrides the configuration)
        #[arg(long)]
        genus: Option<String>,

        /// Project the import is bound to, by identifier or name
        /// (overrides the configuration)
        #[arg(long)]
        project: Option<String>,

        /// Output the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the registered validators
    Validators {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
