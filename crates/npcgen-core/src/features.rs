//! Summary of which optional schema capabilities a schema uses.

use bitflags::bitflags;

use crate::schema::TraitSchema;

bitflags! {
    /// Optional capabilities exercised by a schema.
    ///
    /// Computed from already built data; asking for it has no side effects.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Features: u16 {
        /// A trait weight other than 1.
        const WEIGHT               = 1 << 0;
        /// A category with more than one pick.
        const MULTIPLE_SELECTION   = 1 << 1;
        /// A trait granting bonus picks.
        const BONUS_SELECTION      = 1 << 2;
        /// A hidden trait.
        const HIDDEN_TRAIT         = 1 << 3;
        /// A hidden category.
        const HIDDEN_CATEGORY      = 1 << 4;
        /// An output name differing from the category name.
        const OUTPUT_NAME          = 1 << 5;
        /// A display-order override.
        const CATEGORY_ORDER       = 1 << 6;
        /// A replaceable trait.
        const REPLACEMENT          = 1 << 7;
        /// A category-level requirement.
        const CATEGORY_REQUIREMENT = 1 << 8;
        /// A trait-level requirement.
        const TRAIT_REQUIREMENT    = 1 << 9;
    }
}

impl Features {
    /// Features used anywhere in `schema`.
    pub fn of(schema: &TraitSchema) -> Self {
        let mut features = Self::empty();

        for category in schema.categories() {
            if category.selection_count > 1 {
                features |= Self::MULTIPLE_SELECTION;
            }
            if category.is_hidden {
                features |= Self::HIDDEN_CATEGORY;
            }
            if category.output_name() != category.name() {
                features |= Self::OUTPUT_NAME;
            }
            if category.requirement.is_some() {
                features |= Self::CATEGORY_REQUIREMENT;
            }

            for t in category.traits() {
                if t.weight != 1 {
                    features |= Self::WEIGHT;
                }
                if t.is_hidden {
                    features |= Self::HIDDEN_TRAIT;
                }
                if t.bonus_selection.is_some() {
                    features |= Self::BONUS_SELECTION;
                }
                if t.requirement.is_some() {
                    features |= Self::TRAIT_REQUIREMENT;
                }
            }
        }

        if schema.category_order().is_some() {
            features |= Self::CATEGORY_ORDER;
        }
        if !schema.replacements().is_empty() {
            features |= Self::REPLACEMENT;
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::TraitCategory;
    use crate::replacement::ReplacementSearch;
    use crate::requirement::Requirement;
    use crate::trait_def::{BonusSelection, Trait};

    fn plain_schema() -> TraitSchema {
        let mut schema = TraitSchema::new();
        schema
            .add_category(
                TraitCategory::new("Colour", 1)
                    .with_trait(Trait::new("Green", 1))
                    .unwrap(),
            )
            .unwrap();
        schema
    }

    #[test]
    fn plain_schema_uses_nothing() {
        assert_eq!(plain_schema().features(), Features::empty());
    }

    #[test]
    fn every_feature_is_detected() {
        let mut schema = plain_schema();
        let mut animal = TraitCategory::new("Animal", 2)
            .with_output_name("Beast")
            .hidden()
            .with_requirement(Requirement::has_trait("Colour", "Green").unwrap());
        animal.add_trait(Trait::new("Rhino", 3)).unwrap();
        animal.add_trait(Trait::new("Gorilla", 1).hidden()).unwrap();
        animal
            .add_trait(
                Trait::new("Hawk", 1)
                    .with_requirement(Requirement::has_trait("Colour", "Green").unwrap())
                    .with_bonus_selection(BonusSelection::new("Colour", 1)),
            )
            .unwrap();
        schema.add_category(animal).unwrap();
        schema.set_category_order(vec!["Beast".into(), "Colour".into()]);
        schema
            .add_replacement(ReplacementSearch::new("Colour", "Green"))
            .unwrap();

        assert_eq!(schema.features(), Features::all());
    }

    #[test]
    fn weight_other_than_one() {
        let mut schema = TraitSchema::new();
        schema
            .add_category(
                TraitCategory::new("Colour", 1)
                    .with_trait(Trait::new("Green", 0))
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(schema.features(), Features::WEIGHT);
    }
}
