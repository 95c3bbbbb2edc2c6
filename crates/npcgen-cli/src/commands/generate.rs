use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use npcgen_core::{GenConfig, Npc, Replacement, TraitSchema};

pub fn run(
    path: &Path,
    count: usize,
    seed: Option<u64>,
    format: &str,
    output: Option<&Path>,
    replacements: &[String],
) -> Result<(), String> {
    let schema = super::load_schema(path)?;
    let replacements = replacements
        .iter()
        .map(|r| parse_replacement(r.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    let generator = super::generator(&schema)?;

    let mut config = GenConfig::default().with_count(count);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    let npcs = generator
        .run(&config, &replacements)
        .map_err(|e| e.to_string())?;

    let content = match format {
        "json" => render_json(&npcs, seed)?,
        "table" => render_table(&schema, &npcs),
        _ => {
            return Err(format!(
                "unsupported format: \"{format}\". Use: table, json"
            ));
        }
    };

    if let Some(path) = output {
        std::fs::write(path, &content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Wrote {} NPCs to {}", npcs.len(), path.display());
    } else {
        print!("{content}");
    }

    Ok(())
}

/// Parse `CATEGORY:TRAIT=REPLACEMENT`.
fn parse_replacement(arg: &str) -> Result<Replacement, String> {
    let invalid = || format!("invalid replacement \"{arg}\": expected CATEGORY:TRAIT=REPLACEMENT");
    let (search, replacement) = arg.split_once('=').ok_or_else(invalid)?;
    let (category, trait_name) = search.split_once(':').ok_or_else(invalid)?;
    if category.is_empty() || trait_name.is_empty() || replacement.is_empty() {
        return Err(invalid());
    }
    Ok(Replacement::new(category, trait_name, replacement))
}

fn render_json(npcs: &[Npc], seed: Option<u64>) -> Result<String, String> {
    let export = serde_json::json!({
        "seed": seed,
        "npcs": npcs,
    });
    let mut out =
        serde_json::to_string_pretty(&export).map_err(|e| format!("JSON serialization error: {e}"))?;
    out.push('\n');
    Ok(out)
}

fn render_table(schema: &TraitSchema, npcs: &[Npc]) -> String {
    let columns = schema.output_order();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["#".to_string()];
    header.extend(columns.iter().cloned());
    table.set_header(header);

    for (i, npc) in npcs.iter().enumerate() {
        let mut row = vec![(i + 1).to_string()];
        for column in &columns {
            let names = npc.get_trait_names(column);
            row.push(if names.is_empty() {
                "-".to_string()
            } else {
                names.join(", ")
            });
        }
        table.add_row(row);
    }

    format!("{table}\n\n  {} NPCs\n", npcs.len())
}
