//! Traits: the weighted options a category chooses from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::requirement::Requirement;

/// Identity of a trait: its category name plus its own name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraitId {
    /// Category the trait belongs to.
    pub category: String,
    /// Trait name within its category.
    pub name: String,
}

impl TraitId {
    /// Identifier for `name` in `category`.
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TraitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.category, self.name)
    }
}

/// Extra picks granted to another category when a trait is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusSelection {
    /// Name of the category receiving the picks.
    pub category: String,
    /// Number of extra picks.
    pub selection_count: u32,
}

impl BonusSelection {
    /// Grant `selection_count` extra picks in `category`.
    pub fn new(category: impl Into<String>, selection_count: u32) -> Self {
        Self {
            category: category.into(),
            selection_count,
        }
    }
}

/// A single weighted option inside a category.
#[derive(Debug, Clone)]
pub struct Trait {
    /// Trait name, unique within its category.
    pub name: String,
    /// Relative chance of being picked. Zero means never picked.
    pub weight: u32,
    /// Hidden traits take up a pick but never show in the output.
    pub is_hidden: bool,
    /// The trait is only eligible when this holds.
    pub requirement: Option<Requirement>,
    /// Extra picks granted when the trait is chosen.
    pub bonus_selection: Option<BonusSelection>,
}

impl Trait {
    /// Visible trait with no requirement or bonus.
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
            is_hidden: false,
            requirement: None,
            bonus_selection: None,
        }
    }

    /// Mark the trait as hidden.
    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }

    /// Only offer the trait to NPCs that satisfy `requirement`.
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = Some(requirement);
        self
    }

    /// Grant `bonus` when the trait is chosen.
    pub fn with_bonus_selection(mut self, bonus: BonusSelection) -> Self {
        self.bonus_selection = Some(bonus);
        self
    }
}
