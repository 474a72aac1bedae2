//! Validators command - list the registered validators.

use colored::Colorize;
use phenosift::standard_registry;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let registry = standard_registry()?;

    if json {
        let descriptors: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    for descriptor in registry.iter() {
        println!(
            "{:10} {:20} {}",
            descriptor.scope.label().cyan(),
            descriptor.id.white().bold(),
            descriptor.name
        );
    }

    Ok(())
}
