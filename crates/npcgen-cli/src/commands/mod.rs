pub mod check;
pub mod features;
pub mod generate;
pub mod order;

use std::path::Path;

use npcgen_core::{Generator, TraitSchema};

/// Load a schema file, mapping every failure to a printable message.
fn load_schema(path: &Path) -> Result<TraitSchema, String> {
    crate::schema_file::load(path)
}

/// Validate `schema` and prepare a generator for it.
fn generator(schema: &TraitSchema) -> Result<Generator<'_>, String> {
    Generator::new(schema).map_err(|e| e.to_string())
}
