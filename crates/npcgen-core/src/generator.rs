//! NPC generation: resolves every category of a schema for each NPC.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::category::TraitCategory;
use crate::chooser::TraitChooser;
use crate::error::{GenError, GenResult};
use crate::npc::Npc;
use crate::random::{RandomSource, RngSource};
use crate::replacement::{Replacement, apply_replacements, validate_replacements};
use crate::schema::TraitSchema;
use crate::trait_def::{BonusSelection, TraitId};

/// Configuration for a generation run.
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Number of NPCs to generate.
    pub count: usize,
    /// RNG seed for reproducible output. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            count: 1,
            seed: None,
        }
    }
}

impl GenConfig {
    /// Set the number of NPCs to generate.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Random source for this configuration.
    pub fn rng(&self) -> RngSource<StdRng> {
        match self.seed {
            Some(seed) => RngSource::seeded(seed),
            None => RngSource::from_os_rng(),
        }
    }
}

/// Generates NPCs from a validated, acyclic schema.
///
/// The schema is only read, so one generator can serve several threads
/// as long as each brings its own random source.
#[derive(Debug, Clone)]
pub struct Generator<'s> {
    schema: &'s TraitSchema,
    order: Vec<&'s TraitCategory>,
    output_order: Vec<String>,
}

/// Per-NPC bookkeeping for bonus selections.
#[derive(Debug, Default)]
struct Progress<'s> {
    /// Extra picks granted to categories that have not run yet.
    pending: BTreeMap<&'s str, u32>,
    resolved: BTreeSet<&'s str>,
    skipped: BTreeSet<&'s str>,
}

impl<'s> Generator<'s> {
    /// Validate `schema` and work out the category order.
    pub fn new(schema: &'s TraitSchema) -> GenResult<Self> {
        schema.validate()?;
        if let Some(diagnostic) = schema.has_circular_requirements() {
            return Err(GenError::CircularRequirements(diagnostic));
        }
        let order = schema
            .traversal_order()?
            .iter()
            .filter_map(|name| schema.get_category(name))
            .collect();
        Ok(Self {
            schema,
            order,
            output_order: schema.output_order(),
        })
    }

    /// The schema NPCs are generated from.
    pub fn schema(&self) -> &'s TraitSchema {
        self.schema
    }

    /// Category names in the order they are resolved.
    pub fn traversal_order(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|c| c.name())
    }

    /// Generate `config.count` NPCs with the configured random source.
    pub fn run(&self, config: &GenConfig, replacements: &[Replacement]) -> GenResult<Vec<Npc>> {
        let mut rng = config.rng();
        self.generate(config.count, replacements, &mut rng)
    }

    /// Generate `count` NPCs.
    pub fn generate<R: RandomSource + ?Sized>(
        &self,
        count: usize,
        replacements: &[Replacement],
        rng: &mut R,
    ) -> GenResult<Vec<Npc>> {
        validate_replacements(self.schema, replacements)?;
        info!(count, categories = self.order.len(), "generating NPCs");
        (0..count)
            .map(|index| {
                let _span = tracing::debug_span!("npc", index).entered();
                self.build_npc(replacements, rng)
            })
            .collect()
    }

    /// Generate a single NPC.
    pub fn generate_npc<R: RandomSource + ?Sized>(
        &self,
        replacements: &[Replacement],
        rng: &mut R,
    ) -> GenResult<Npc> {
        validate_replacements(self.schema, replacements)?;
        self.build_npc(replacements, rng)
    }

    fn build_npc<R: RandomSource + ?Sized>(
        &self,
        replacements: &[Replacement],
        rng: &mut R,
    ) -> GenResult<Npc> {
        let mut npc = Npc::new();
        let mut progress = Progress::default();

        for &category in &self.order {
            let name = category.name();
            if !category.is_hidden {
                npc.ensure_category(category.output_name());
            }

            if let Some(requirement) = &category.requirement
                && !requirement.evaluate(&npc)?
            {
                debug!(category = name, "requirement not met, skipping");
                progress.pending.remove(name);
                progress.skipped.insert(name);
                continue;
            }

            let bonus = progress.pending.remove(name).unwrap_or(0);
            let count = add_picks(name, category.selection_count, bonus)?;
            let bonuses = self.pick(category, count, &mut npc, rng)?;
            progress.resolved.insert(name);
            self.grant(bonuses, &mut progress, &mut npc, rng)?;
        }

        apply_replacements(&mut npc, replacements);
        npc.apply_output_order(&self.output_order);
        Ok(npc)
    }

    /// Hand out bonus selections. Categories that already ran are reopened
    /// at once; the rest pick the extra count up when their turn comes.
    fn grant<R: RandomSource + ?Sized>(
        &self,
        bonuses: Vec<&'s BonusSelection>,
        progress: &mut Progress<'s>,
        npc: &mut Npc,
        rng: &mut R,
    ) -> GenResult<()> {
        let mut queue = VecDeque::from(bonuses);
        while let Some(bonus) = queue.pop_front() {
            let target = self
                .schema
                .get_category(&bonus.category)
                .ok_or_else(|| GenError::UnknownCategory(bonus.category.clone()))?;
            let name = target.name();

            if progress.skipped.contains(name) {
                warn!(
                    category = name,
                    picks = bonus.selection_count,
                    "bonus selection into a skipped category dropped"
                );
            } else if progress.resolved.contains(name) {
                debug!(category = name, picks = bonus.selection_count, "reopening category");
                let more = self.pick(target, bonus.selection_count, npc, rng)?;
                queue.extend(more);
            } else {
                let pending = progress.pending.entry(name).or_default();
                *pending = add_picks(name, *pending, bonus.selection_count)?;
            }
        }
        Ok(())
    }

    /// Draw `count` traits of `category` not yet chosen for `npc` whose
    /// requirements hold, and record them.
    fn pick<R: RandomSource + ?Sized>(
        &self,
        category: &'s TraitCategory,
        count: u32,
        npc: &mut Npc,
        rng: &mut R,
    ) -> GenResult<Vec<&'s BonusSelection>> {
        let mut pool = Vec::with_capacity(category.traits().len());
        for t in category.traits() {
            if npc.has_trait(&TraitId::new(category.name(), &t.name)) {
                continue;
            }
            if let Some(requirement) = &t.requirement
                && !requirement.evaluate(npc)?
            {
                continue;
            }
            pool.push(t);
        }

        let selection = TraitChooser::new(category.name(), pool).choose(count, rng)?;
        for t in &selection.chosen {
            let id = TraitId::new(category.name(), &t.name);
            if !category.is_hidden && !t.is_hidden {
                npc.add_trait_name(category.output_name(), &id);
            }
            npc.record_trait(id);
        }
        debug!(
            category = category.name(),
            count,
            visible = ?selection.visible_names(),
            "resolved category"
        );
        Ok(selection.bonus_selections)
    }
}

fn add_picks(category: &str, picks: u32, extra: u32) -> GenResult<u32> {
    picks
        .checked_add(extra)
        .ok_or_else(|| GenError::SelectionCountOverflow {
            category: category.to_string(),
        })
}

/// Generate `count` NPCs from `schema` without replacements.
pub fn generate<R: RandomSource + ?Sized>(
    schema: &TraitSchema,
    count: usize,
    rng: &mut R,
) -> GenResult<Vec<Npc>> {
    Generator::new(schema)?.generate(count, &[], rng)
}
