//! Trait categories: named pools of traits with a selection count.

use std::collections::BTreeSet;

use crate::error::{GenError, GenResult};
use crate::requirement::Requirement;
use crate::trait_def::Trait;

/// A named bucket of traits from which each NPC receives `selection_count`
/// picks.
#[derive(Debug, Clone)]
pub struct TraitCategory {
    name: String,
    output_name: String,
    /// Picks per NPC before any bonus selections.
    pub selection_count: u32,
    /// Hidden categories are resolved but left out of the output.
    pub is_hidden: bool,
    /// Gate for the whole category.
    pub requirement: Option<Requirement>,
    traits: Vec<Trait>,
}

impl TraitCategory {
    /// Empty category whose output name is `name`.
    pub fn new(name: impl Into<String>, selection_count: u32) -> Self {
        let name = name.into();
        Self {
            output_name: name.clone(),
            name,
            selection_count,
            is_hidden: false,
            requirement: None,
            traits: Vec::new(),
        }
    }

    /// Display under a different name than the category name.
    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = output_name.into();
        self
    }

    /// Resolve the category without showing it.
    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }

    /// Skip the category for NPCs that do not satisfy `requirement`.
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = Some(requirement);
        self
    }

    /// Builder form of [`Self::add_trait`].
    pub fn with_trait(mut self, t: Trait) -> GenResult<Self> {
        self.add_trait(t)?;
        Ok(self)
    }

    /// Add a trait. Names must be unique within the category.
    pub fn add_trait(&mut self, t: Trait) -> GenResult<()> {
        if self.get_trait(&t.name).is_some() {
            return Err(GenError::DuplicateTrait {
                category: self.name.clone(),
                trait_name: t.name,
            });
        }
        self.traits.push(t);
        Ok(())
    }

    /// Name used by requirements and bonus selections.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the category is shown under.
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Traits in the order they were added.
    pub fn traits(&self) -> &[Trait] {
        &self.traits
    }

    /// Look up a trait by name.
    pub fn get_trait(&self, name: &str) -> Option<&Trait> {
        self.traits.iter().find(|t| t.name == name)
    }

    /// Summed weight of all traits.
    pub fn total_weight(&self) -> u64 {
        self.traits.iter().map(|t| u64::from(t.weight)).sum()
    }

    /// Categories named by the category requirement or by any trait
    /// requirement. The category itself is left out.
    pub fn required_categories(&self) -> BTreeSet<&str> {
        self.requirement
            .iter()
            .chain(self.traits.iter().filter_map(|t| t.requirement.as_ref()))
            .flat_map(Requirement::referenced_categories)
            .filter(|c| *c != self.name)
            .collect()
    }

    /// Categories that traits of this category grant bonus picks into.
    pub fn bonus_targets(&self) -> BTreeSet<&str> {
        self.traits
            .iter()
            .filter_map(|t| t.bonus_selection.as_ref())
            .map(|b| b.category.as_str())
            .collect()
    }
}
