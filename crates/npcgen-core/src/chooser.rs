//! Weighted selection without replacement.

use crate::error::{GenError, GenResult};
use crate::random::RandomSource;
use crate::trait_def::{BonusSelection, Trait};

/// The outcome of one [`TraitChooser::choose`] call.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    /// Every chosen trait in draw order, hidden ones included.
    pub chosen: Vec<&'a Trait>,
    /// Bonus selections carried by the chosen traits.
    pub bonus_selections: Vec<&'a BonusSelection>,
}

impl<'a> Selection<'a> {
    /// Names of the chosen traits that are not hidden.
    pub fn visible_names(&self) -> Vec<&'a str> {
        self.chosen
            .iter()
            .filter(|t| !t.is_hidden)
            .map(|t| t.name.as_str())
            .collect()
    }
}

/// Draws traits from one category's pool for one NPC.
///
/// A trait's chance on each draw is its weight over the summed weight of
/// the traits still in the pool. Chosen traits leave the pool, so repeated
/// calls keep drawing without replacement.
#[derive(Debug, Clone)]
pub struct TraitChooser<'a> {
    category: &'a str,
    remaining: Vec<&'a Trait>,
    remaining_weight: u64,
}

impl<'a> TraitChooser<'a> {
    /// Chooser over `traits`, reporting errors against `category`.
    pub fn new(category: &'a str, traits: impl IntoIterator<Item = &'a Trait>) -> Self {
        let remaining: Vec<&Trait> = traits.into_iter().collect();
        let remaining_weight = remaining.iter().map(|t| u64::from(t.weight)).sum();
        Self {
            category,
            remaining,
            remaining_weight,
        }
    }

    /// Number of traits still in the pool.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Summed weight of the traits still in the pool.
    pub fn remaining_weight(&self) -> u64 {
        self.remaining_weight
    }

    /// Draw exactly `count` traits.
    ///
    /// Fails if the pool holds fewer than `count` traits, or if a draw is
    /// needed while the remaining weight is zero.
    pub fn choose<R: RandomSource + ?Sized>(
        &mut self,
        count: u32,
        rng: &mut R,
    ) -> GenResult<Selection<'a>> {
        if count as usize > self.remaining.len() {
            return Err(GenError::InsufficientTraits {
                category: self.category.to_string(),
                requested: count,
                available: self.remaining.len(),
            });
        }

        let mut selection = Selection::default();
        for _ in 0..count {
            let picked = self.draw(rng)?;
            if let Some(bonus) = &picked.bonus_selection {
                selection.bonus_selections.push(bonus);
            }
            selection.chosen.push(picked);
        }
        Ok(selection)
    }

    fn draw<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> GenResult<&'a Trait> {
        if self.remaining_weight == 0 {
            return Err(GenError::ZeroTotalWeight(self.category.to_string()));
        }
        let target = rng.next_in(0..self.remaining_weight);

        let mut running = 0u64;
        let index = self
            .remaining
            .iter()
            .position(|t| {
                running += u64::from(t.weight);
                running > target
            })
            .ok_or_else(|| GenError::ZeroTotalWeight(self.category.to_string()))?;

        let picked = self.remaining.remove(index);
        self.remaining_weight -= u64::from(picked.weight);
        Ok(picked)
    }
}
