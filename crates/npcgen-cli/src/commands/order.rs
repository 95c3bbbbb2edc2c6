use std::path::Path;

use colored::Colorize;

pub fn run(path: &Path) -> Result<(), String> {
    let schema = super::load_schema(path)?;
    let generator = super::generator(&schema)?;

    for (i, name) in generator.traversal_order().enumerate() {
        let Some(category) = schema.get_category(name) else {
            continue;
        };
        let mut line = format!("  {:>2}. {name}", i + 1);
        if category.output_name() != name {
            line.push_str(&format!(" {}", format!("as '{}'", category.output_name()).dimmed()));
        }
        if category.is_hidden {
            line.push_str(&format!(" {}", "(hidden)".dimmed()));
        }
        println!("{line}");
    }

    Ok(())
}
