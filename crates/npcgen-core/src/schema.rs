//! The trait schema and its category dependency graph.
//!
//! A category depends on every category its requirements look at. Bonus
//! selections add a second layer: if category C depends on D, and B can
//! grant extra picks into D (directly or through a chain of grants), then
//! D is not final until B has run, so C depends on B and on everything B
//! depends on. Grants are tracked in a separate "bonus graph" whose edges
//! point from the receiving category back to the granting one, so the set
//! of categories able to add picks to D is a reachability query.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::category::TraitCategory;
use crate::digraph::Digraph;
use crate::error::{GenError, GenResult};
use crate::features::Features;
use crate::npc::Npc;
use crate::replacement::ReplacementSearch;
use crate::trait_def::{Trait, TraitId};

/// Why one category has to be resolved after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// The dependent category's requirements look at the original category.
    Requirement,
    /// The original category grants bonus picks into the dependent one.
    BonusSelection,
}

/// One link in the explanation of a dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    /// Category that has to be resolved first.
    pub original_category: String,
    /// Category that waits for it.
    pub dependent_category: String,
    /// Why the dependent waits.
    pub kind: DependencyKind,
}

impl Dependency {
    /// `dependent` requires a trait of `original`.
    pub fn requirement(original: &str, dependent: &str) -> Self {
        Self {
            original_category: original.to_string(),
            dependent_category: dependent.to_string(),
            kind: DependencyKind::Requirement,
        }
    }

    /// `original` grants bonus picks into `dependent`.
    pub fn bonus_selection(original: &str, dependent: &str) -> Self {
        Self {
            original_category: original.to_string(),
            dependent_category: dependent.to_string(),
            kind: DependencyKind::BonusSelection,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DependencyKind::Requirement => write!(
                f,
                "{} requires {}",
                self.dependent_category, self.original_category
            ),
            DependencyKind::BonusSelection => write!(
                f,
                "{} bonus-selects into {}",
                self.original_category, self.dependent_category
            ),
        }
    }
}

/// A dependency cycle between categories, with the links that form it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleDiagnostic {
    /// Category names along the cycle, closed on itself.
    pub cycle: Vec<String>,
    /// Requirement and bonus selection links along the cycle.
    pub dependencies: Vec<Dependency>,
}

impl fmt::Display for CycleDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dependencies.is_empty() {
            return write!(f, "{}", self.cycle.join(" -> "));
        }
        let links: Vec<String> = self.dependencies.iter().map(ToString::to_string).collect();
        write!(f, "{}", links.join("; "))
    }
}

/// All categories of a generator, plus replacement rules and display order.
#[derive(Debug, Clone, Default)]
pub struct TraitSchema {
    categories: Vec<TraitCategory>,
    replacements: Vec<ReplacementSearch>,
    category_order: Option<Vec<String>>,
}

type DirectRequirements<'a> = BTreeMap<&'a str, BTreeSet<&'a str>>;

impl TraitSchema {
    /// Empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category. Names must be unique.
    pub fn add_category(&mut self, category: TraitCategory) -> GenResult<()> {
        if self.get_category(category.name()).is_some() {
            return Err(GenError::DuplicateCategory(category.name().to_string()));
        }
        self.categories.push(category);
        Ok(())
    }

    /// Declare a trait as replaceable. The trait must already exist.
    pub fn add_replacement(&mut self, search: ReplacementSearch) -> GenResult<()> {
        self.find_trait(&search.trait_id())?;
        if !self.replacements.contains(&search) {
            self.replacements.push(search);
        }
        Ok(())
    }

    /// Override the display order with a list of output names.
    pub fn set_category_order(&mut self, order: Vec<String>) {
        self.category_order = Some(order);
    }

    /// Categories in the order they were added.
    pub fn categories(&self) -> &[TraitCategory] {
        &self.categories
    }

    /// Look up a category by name.
    pub fn get_category(&self, name: &str) -> Option<&TraitCategory> {
        self.categories.iter().find(|c| c.name() == name)
    }

    /// Traits that may be renamed at generation time.
    pub fn replacements(&self) -> &[ReplacementSearch] {
        &self.replacements
    }

    /// The display-order override, if set.
    pub fn category_order(&self) -> Option<&[String]> {
        self.category_order.as_deref()
    }

    /// Look up a trait, failing if its category or name is unknown.
    pub fn find_trait(&self, id: &TraitId) -> GenResult<&Trait> {
        let category = self
            .get_category(&id.category)
            .ok_or_else(|| GenError::UnknownCategory(id.category.clone()))?;
        category
            .get_trait(&id.name)
            .ok_or_else(|| GenError::UnknownTrait {
                category: id.category.clone(),
                trait_name: id.name.clone(),
            })
    }

    /// Output names in display order.
    ///
    /// Names from the display-order override come first. Visible output
    /// names it leaves out follow in the order their categories were added.
    pub fn output_order(&self) -> Vec<String> {
        let mut names = self.category_order.clone().unwrap_or_default();
        for category in self.categories.iter().filter(|c| !c.is_hidden) {
            if !names.iter().any(|n| n == category.output_name()) {
                names.push(category.output_name().to_string());
            }
        }
        names
    }

    /// Optional capabilities this schema uses.
    pub fn features(&self) -> Features {
        Features::of(self)
    }

    /// Check cross references that cannot be checked while categories are
    /// still being added.
    ///
    /// Every requirement must name existing traits and be free of logic
    /// errors, every bonus selection must grant at least one pick into an
    /// existing category, and the display order may only name output names
    /// in use.
    pub fn validate(&self) -> GenResult<()> {
        let empty = Npc::new();
        for category in &self.categories {
            let requirements = category
                .requirement
                .iter()
                .chain(category.traits().iter().filter_map(|t| t.requirement.as_ref()));
            for requirement in requirements {
                for id in requirement.referenced_traits() {
                    self.find_trait(id)?;
                }
                // Every operand is visited, so an empty NPC surfaces any
                // structural logic error.
                requirement.evaluate(&empty)?;
            }

            for bonus in category.traits().iter().filter_map(|t| t.bonus_selection.as_ref()) {
                if self.get_category(&bonus.category).is_none() {
                    return Err(GenError::UnknownCategory(bonus.category.clone()));
                }
                if bonus.selection_count == 0 {
                    return Err(GenError::InvalidBonusSelection {
                        source_category: category.name().to_string(),
                        target: bonus.category.clone(),
                    });
                }
            }
        }

        if let Some(order) = &self.category_order {
            for name in order {
                if !self.categories.iter().any(|c| c.output_name() == name) {
                    return Err(GenError::UnknownOutputName(name.clone()));
                }
            }
        }
        Ok(())
    }

    fn direct_requirements(&self) -> DirectRequirements<'_> {
        self.categories
            .iter()
            .map(|c| (c.name(), c.required_categories()))
            .collect()
    }

    /// Graph with an edge `target -> grantor` for every bonus selection.
    pub fn bonus_graph(&self) -> Digraph<String> {
        let mut graph = Digraph::new();
        for category in &self.categories {
            graph.add_node(category.name().to_string());
            for target in category.bonus_targets() {
                graph.add_edge(target.to_string(), category.name().to_string());
            }
        }
        graph
    }

    /// Category dependency graph: an edge `X -> Y` means X is resolved
    /// before Y.
    pub fn requirement_graph(&self) -> Digraph<String> {
        let bonus = self.bonus_graph();
        let direct = self.direct_requirements();

        let mut graph = Digraph::new();
        for category in &self.categories {
            graph.add_node(category.name().to_string());
        }

        for (dependent, required) in &direct {
            for prerequisite in required {
                graph.add_edge(prerequisite.to_string(), dependent.to_string());

                for grantor in bonus.reachable_from(&prerequisite.to_string()) {
                    for inherited in direct.get(grantor.as_str()).into_iter().flatten() {
                        graph.add_edge(inherited.to_string(), dependent.to_string());
                    }
                    graph.add_edge(grantor, dependent.to_string());
                }
            }
        }
        graph
    }

    /// Describe a dependency cycle, if the schema has one.
    pub fn has_circular_requirements(&self) -> Option<CycleDiagnostic> {
        self.requirement_graph()
            .has_cycle()
            .map(|cycle| self.explain_cycle(cycle))
    }

    /// Category names in an order where each category comes after every
    /// category it depends on.
    pub fn traversal_order(&self) -> GenResult<Vec<String>> {
        self.requirement_graph()
            .prerequisite_traversal_order()
            .map_err(|e| GenError::CircularRequirements(self.explain_cycle(e.cycle)))
    }

    fn explain_cycle(&self, cycle: Vec<String>) -> CycleDiagnostic {
        let bonus = self.bonus_graph();
        let direct = self.direct_requirements();
        let dependencies = cycle
            .windows(2)
            .flat_map(|pair| explain_edge(&pair[0], &pair[1], &direct, &bonus))
            .collect();
        CycleDiagnostic {
            cycle,
            dependencies,
        }
    }
}

/// Break one edge of the requirement graph back into the links that
/// produced it.
fn explain_edge(
    from: &str,
    to: &str,
    direct: &DirectRequirements<'_>,
    bonus: &Digraph<String>,
) -> Vec<Dependency> {
    let Some(required) = direct.get(to) else {
        return Vec::new();
    };
    if required.contains(from) {
        return vec![Dependency::requirement(from, to)];
    }

    // `from` grants picks, possibly through other categories, into a
    // prerequisite of `to`.
    for prerequisite in required {
        if let Some(path) = bonus.shortest_path(&prerequisite.to_string(), &from.to_string()) {
            let mut links = grant_chain(&path);
            links.push(Dependency::requirement(prerequisite, to));
            return links;
        }
    }

    // `from` is required by a category that grants into a prerequisite of `to`.
    for prerequisite in required {
        let prerequisite_node = prerequisite.to_string();
        for grantor in bonus.reachable_from(&prerequisite_node) {
            let grantor_requires_from = direct
                .get(grantor.as_str())
                .is_some_and(|r| r.contains(from));
            if !grantor_requires_from {
                continue;
            }
            if let Some(path) = bonus.shortest_path(&prerequisite_node, &grantor) {
                let mut links = vec![Dependency::requirement(from, &grantor)];
                links.extend(grant_chain(&path));
                links.push(Dependency::requirement(prerequisite, to));
                return links;
            }
        }
    }
    Vec::new()
}

/// Turn a bonus-graph path `target, ..., grantor` into grant links ordered
/// from the grantor down to the target.
fn grant_chain(path: &[String]) -> Vec<Dependency> {
    path.windows(2)
        .rev()
        .map(|pair| Dependency::bonus_selection(&pair[1], &pair[0]))
        .collect()
}
