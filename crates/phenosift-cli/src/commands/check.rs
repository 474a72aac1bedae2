//! Check command - run all configured checks against a trait data file.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use serde::Deserialize;

use phenosift::{FileRef, ImportCheck, ImportConfig, LocalFiles, MemoryStore, RunReport, Status};

/// Known records seeded into the in-memory store for a standalone run.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoreSeed {
    genera: Vec<GenusSeed>,
    projects: Vec<ProjectSeed>,
    combinations: Vec<CombinationSeed>,
}

#[derive(Debug, Deserialize)]
struct GenusSeed {
    name: String,
    #[serde(default = "default_configured")]
    configured: bool,
}

fn default_configured() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ProjectSeed {
    id: u64,
    name: String,
    genus: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CombinationSeed {
    trait_name: String,
    method: String,
    unit: String,
}

pub fn run(
    file: PathBuf,
    config: Option<PathBuf>,
    store: Option<PathBuf>,
    genus: Option<String>,
    project: Option<String>,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut import_config = match config {
        Some(path) => {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            serde_json::from_str::<ImportConfig>(&contents)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?
        }
        None => ImportConfig::default(),
    };

    // Command-line metadata wins over the configuration file.
    if genus.is_some() {
        import_config.genus = genus;
    }
    if project.is_some() {
        import_config.project = project;
    }

    let memory_store = build_store(store)?;

    let check = ImportCheck::new(
        Arc::new(LocalFiles::new()),
        Arc::new(memory_store),
        import_config,
    );
    let report = check.run(&FileRef::Path(file.clone()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&file, &report, verbose);
    }

    if report.summary.ok {
        Ok(())
    } else {
        Err(format!("{} check(s) failed", report.summary.failed).into())
    }
}

fn build_store(seed: Option<PathBuf>) -> Result<MemoryStore, Box<dyn std::error::Error>> {
    let mut store = MemoryStore::new();
    let Some(path) = seed else {
        return Ok(store);
    };

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| format!("Cannot read store seed {}: {}", path.display(), e))?;
    let seed: StoreSeed = serde_json::from_str(&contents)
        .map_err(|e| format!("Invalid store seed {}: {}", path.display(), e))?;

    for genus in seed.genera {
        store.insert_genus(genus.name, genus.configured);
    }
    for project in seed.projects {
        store.insert_project(project.id, project.name);
        if let Some(genus) = project.genus {
            store.set_project_genus(project.id, genus);
        }
    }
    for combination in seed.combinations {
        store.insert_combination(&combination.trait_name, &combination.method, &combination.unit);
    }

    Ok(store)
}

fn print_report(file: &PathBuf, report: &RunReport, verbose: bool) {
    println!(
        "{} {}",
        "Checking".cyan().bold(),
        file.display().to_string().white()
    );

    if let Some(source) = &report.source {
        if verbose {
            println!("  {} bytes, {}", source.size_bytes, source.hash);
        }
    }
    println!();

    for recorded in &report.outcomes {
        // Passing checks only show up in verbose mode.
        if recorded.outcome.status == Status::Pass && !verbose {
            continue;
        }

        let status = match recorded.outcome.status {
            Status::Pass => "PASS".green().bold(),
            Status::Fail => "FAIL".red().bold(),
            Status::Todo => "TODO".yellow().bold(),
        };
        let location = recorded
            .line
            .map(|line| format!("line {line}"))
            .unwrap_or_default();

        println!(
            "  {} {:18} {:8} {}",
            status, recorded.validator, location, recorded.outcome.case
        );
        for item in &recorded.outcome.failed {
            let value = item
                .value
                .as_deref()
                .map(|v| format!(" ({v:?})"))
                .unwrap_or_default();
            println!("         {}{}", item.detail, value);
        }
    }

    println!();
    println!(
        "{} passed, {} failed, {} skipped",
        report.summary.passed.to_string().green(),
        report.summary.failed.to_string().red(),
        report.summary.skipped.to_string().yellow()
    );

    if report.summary.ok {
        println!("{}", "File is ready for import.".green().bold());
    }
}
