//! Phenosift CLI - pre-import checks for tabular trait data files.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            file,
            config,
            store,
            genus,
            project,
            json,
        } => commands::check::run(file, config, store, genus, project, json, cli.verbose),

        Commands::Validators { json } => commands::validators::run(json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
