use std::path::Path;

use colored::Colorize;

pub fn run(path: &Path) -> Result<(), String> {
    let schema = super::load_schema(path)?;
    schema.validate().map_err(|e| e.to_string())?;

    if let Some(diagnostic) = schema.has_circular_requirements() {
        eprintln!("  {}", "Dependency cycle".red().bold());
        eprintln!("  {}", diagnostic.cycle.join(" -> "));
        for dependency in &diagnostic.dependencies {
            eprintln!("    {dependency}");
        }
        return Err(format!("circular requirements in {}", path.display()));
    }

    let traits: usize = schema.categories().iter().map(|c| c.traits().len()).sum();
    println!("  All checks passed for '{}'.", path.display());
    println!(
        "  {} categories, {} traits, {} replacements",
        schema.categories().len(),
        traits,
        schema.replacements().len()
    );

    Ok(())
}
