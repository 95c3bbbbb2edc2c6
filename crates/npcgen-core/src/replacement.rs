//! Cosmetic renaming of chosen traits after generation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::npc::Npc;
use crate::schema::TraitSchema;
use crate::trait_def::TraitId;

/// A trait the schema allows to be renamed at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReplacementSearch {
    /// Category of the trait.
    pub category: String,
    /// Name of the trait.
    #[serde(rename = "trait")]
    pub trait_name: String,
}

impl ReplacementSearch {
    /// Mark `trait_name` in `category` as replaceable.
    pub fn new(category: impl Into<String>, trait_name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            trait_name: trait_name.into(),
        }
    }

    /// Identifier of the searched trait.
    pub fn trait_id(&self) -> TraitId {
        TraitId::new(&self.category, &self.trait_name)
    }
}

/// Show `replacement` wherever the searched trait was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// The trait being renamed.
    pub search: ReplacementSearch,
    /// Trait name shown instead.
    pub replacement: String,
}

impl Replacement {
    /// Show `replacement` for `trait_name` in `category`.
    pub fn new(
        category: impl Into<String>,
        trait_name: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            search: ReplacementSearch::new(category, trait_name),
            replacement: replacement.into(),
        }
    }
}

/// Check that every replacement targets a declared search and substitutes
/// another trait of the same category.
pub fn validate_replacements(schema: &TraitSchema, replacements: &[Replacement]) -> GenResult<()> {
    for r in replacements {
        if !schema.replacements().contains(&r.search) {
            return Err(GenError::UnknownReplacement {
                category: r.search.category.clone(),
                trait_name: r.search.trait_name.clone(),
            });
        }
        let category = schema
            .get_category(&r.search.category)
            .ok_or_else(|| GenError::UnknownCategory(r.search.category.clone()))?;
        if category.get_trait(&r.replacement).is_none() {
            return Err(GenError::InvalidReplacement {
                category: r.search.category.clone(),
                replacement: r.replacement.clone(),
            });
        }
    }
    Ok(())
}

/// Rename chosen traits on `npc` in one pass. Each visible name is looked
/// up by the trait originally chosen, and requirement checks keep using
/// the original traits.
pub(crate) fn apply_replacements(npc: &mut Npc, replacements: &[Replacement]) {
    if replacements.is_empty() {
        return;
    }
    let lookup: BTreeMap<TraitId, String> = replacements
        .iter()
        .map(|r| (r.search.trait_id(), r.replacement.clone()))
        .collect();
    npc.rename_traits(&lookup);
}
