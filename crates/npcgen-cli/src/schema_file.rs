//! JSON schema files.

use std::path::Path;

use serde::Deserialize;

use npcgen_core::{
    BonusSelection, Expr, GenResult, ReplacementSearch, Requirement, Trait, TraitCategory,
    TraitSchema,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    pub categories: Vec<CategoryDef>,
    #[serde(default)]
    pub replacements: Vec<ReplacementSearch>,
    #[serde(default)]
    pub category_order: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default = "one")]
    pub selections: u32,
    #[serde(default)]
    pub output_name: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub requirement: Option<Expr>,
    pub traits: Vec<TraitDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraitDef {
    pub name: String,
    #[serde(default = "one")]
    pub weight: u32,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub requirement: Option<Expr>,
    #[serde(default)]
    pub bonus_selection: Option<BonusDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BonusDef {
    pub category: String,
    #[serde(default = "one")]
    pub selections: u32,
}

fn one() -> u32 {
    1
}

impl SchemaFile {
    /// Build the schema. Cross references are checked later by
    /// [`TraitSchema::validate`].
    pub fn into_schema(self) -> GenResult<TraitSchema> {
        let mut schema = TraitSchema::new();

        for def in self.categories {
            let mut category = TraitCategory::new(def.name, def.selections);
            if let Some(output_name) = def.output_name {
                category = category.with_output_name(output_name);
            }
            if def.hidden {
                category = category.hidden();
            }
            if let Some(expr) = &def.requirement {
                category = category.with_requirement(Requirement::from_expr(expr)?);
            }

            for t in def.traits {
                let mut built = Trait::new(t.name, t.weight);
                if t.hidden {
                    built = built.hidden();
                }
                if let Some(expr) = &t.requirement {
                    built = built.with_requirement(Requirement::from_expr(expr)?);
                }
                if let Some(bonus) = t.bonus_selection {
                    built = built.with_bonus_selection(BonusSelection::new(
                        bonus.category,
                        bonus.selections,
                    ));
                }
                category.add_trait(built)?;
            }
            schema.add_category(category)?;
        }

        for search in self.replacements {
            schema.add_replacement(search)?;
        }
        if let Some(order) = self.category_order {
            schema.set_category_order(order);
        }
        Ok(schema)
    }
}

/// Read and build the schema at `path`.
pub fn load(path: &Path) -> Result<TraitSchema, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let file: SchemaFile = serde_json::from_str(&text)
        .map_err(|e| format!("invalid schema file {}: {e}", path.display()))?;
    let schema = file.into_schema().map_err(|e| e.to_string())?;
    tracing::debug!(
        path = %path.display(),
        categories = schema.categories().len(),
        "loaded schema"
    );
    Ok(schema)
}
