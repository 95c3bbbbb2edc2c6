//! The NPC record built up during generation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::trait_def::TraitId;

/// Visible trait names recorded under one output name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NpcCategory {
    /// The output (display) name of the category.
    pub name: String,
    /// Visible trait names, in the order they were picked.
    pub traits: Vec<String>,
    /// The chosen trait behind each entry of `traits`.
    #[serde(skip)]
    sources: Vec<TraitId>,
}

impl NpcCategory {
    /// The chosen traits behind the visible names, in the same order.
    pub fn sources(&self) -> &[TraitId] {
        &self.sources
    }
}

/// A generated NPC.
///
/// Keeps every chosen trait, hidden ones included, for requirement checks,
/// and the visible names per output category for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Npc {
    #[serde(skip)]
    selected: BTreeSet<TraitId>,
    categories: Vec<NpcCategory>,
}

impl Npc {
    /// An NPC with nothing chosen yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the trait was chosen for this NPC, hidden or not.
    pub fn has_trait(&self, id: &TraitId) -> bool {
        self.selected.contains(id)
    }

    /// Every chosen trait in ascending order.
    pub fn selected_traits(&self) -> impl Iterator<Item = &TraitId> {
        self.selected.iter()
    }

    /// Visible trait names under an output name. Empty if there are none.
    pub fn get_trait_names(&self, output_name: &str) -> &[String] {
        self.categories
            .iter()
            .find(|c| c.name == output_name)
            .map(|c| c.traits.as_slice())
            .unwrap_or_default()
    }

    /// Output categories in display order.
    pub fn categories(&self) -> &[NpcCategory] {
        &self.categories
    }

    pub(crate) fn record_trait(&mut self, id: TraitId) {
        self.selected.insert(id);
    }

    pub(crate) fn ensure_category(&mut self, output_name: &str) -> &mut NpcCategory {
        let index = match self.categories.iter().position(|c| c.name == output_name) {
            Some(index) => index,
            None => {
                self.categories.push(NpcCategory {
                    name: output_name.to_string(),
                    traits: Vec::new(),
                    sources: Vec::new(),
                });
                self.categories.len() - 1
            }
        };
        &mut self.categories[index]
    }

    /// Show the chosen trait `id` under `output_name`.
    pub(crate) fn add_trait_name(&mut self, output_name: &str, id: &TraitId) {
        let category = self.ensure_category(output_name);
        category.traits.push(id.name.clone());
        category.sources.push(id.clone());
    }

    /// Show `replacements[id]` for every visible trait chosen as `id`.
    /// Names are looked up by the chosen trait, never by the shown text.
    pub(crate) fn rename_traits(&mut self, replacements: &BTreeMap<TraitId, String>) {
        for category in &mut self.categories {
            for (name, source) in category.traits.iter_mut().zip(&category.sources) {
                if let Some(replacement) = replacements.get(source) {
                    name.clone_from(replacement);
                }
            }
        }
    }

    /// Reorder the output categories. Names missing from `order` keep their
    /// relative order after the listed ones.
    pub(crate) fn apply_output_order(&mut self, order: &[String]) {
        self.categories.sort_by_key(|c| {
            order
                .iter()
                .position(|name| *name == c.name)
                .unwrap_or(usize::MAX)
        });
    }
}
