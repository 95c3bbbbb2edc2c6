use std::path::Path;

use colored::Colorize;
use npcgen_core::Features;

pub fn run(path: &Path) -> Result<(), String> {
    let schema = super::load_schema(path)?;
    let features = schema.features();

    if features.is_empty() {
        println!("  No optional features in use.");
        return Ok(());
    }

    for (name, _) in features.iter_names() {
        println!("  {} {}", "+".green(), describe(name));
    }
    println!();
    println!(
        "  {} of {} features in use",
        features.iter().count(),
        Features::all().iter().count()
    );

    Ok(())
}

/// `BONUS_SELECTION` reads as "bonus selection".
fn describe(flag: &str) -> String {
    flag.to_lowercase().replace('_', " ")
}
