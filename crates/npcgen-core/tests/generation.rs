//! Integration tests for NPC generation.
use std::collections::VecDeque;
use std::ops::Range;

use npcgen_core::{
    BonusSelection, DependencyKind, Expr, GenError, Generator, Npc, RandomSource, Replacement,
    ReplacementSearch, Requirement, RngSource, Trait, TraitCategory, TraitId, TraitSchema, generate,
};

/// Plays back fixed draws, then the lowest value of each range.
struct Script(VecDeque<u64>);

impl Script {
    fn new(draws: &[u64]) -> Self {
        Self(draws.iter().copied().collect())
    }
}

impl RandomSource for Script {
    fn next_in(&mut self, range: Range<u64>) -> u64 {
        let draw = self.0.pop_front().unwrap_or(range.start);
        assert!(range.contains(&draw), "draw {draw} outside {range:?}");
        draw
    }
}

fn category(name: &str, count: u32, traits: &[(&str, u32)]) -> TraitCategory {
    let mut c = TraitCategory::new(name, count);
    for (t, w) in traits {
        c.add_trait(Trait::new(*t, *w)).unwrap();
    }
    c
}

fn colour_animal() -> TraitSchema {
    let mut schema = TraitSchema::new();
    schema
        .add_category(category("Colour", 1, &[("Green", 1), ("Red", 1)]))
        .unwrap();
    schema
        .add_category(category("Animal", 1, &[("Gorilla", 1), ("Rhino", 1)]))
        .unwrap();
    schema
}

fn weapon_schema() -> TraitSchema {
    let mut weapon = TraitCategory::new("Weapon", 1);
    weapon
        .add_trait(Trait::new("Sword", 1).with_bonus_selection(BonusSelection::new("Enchantment", 1)))
        .unwrap();
    weapon.add_trait(Trait::new("Club", 1)).unwrap();

    let mut schema = TraitSchema::new();
    schema.add_category(weapon).unwrap();
    schema
        .add_category(category("Enchantment", 0, &[("Flaming", 1), ("Frost", 1)]))
        .unwrap();
    schema
}

#[test]
fn colour_and_animal_end_to_end() {
    let schema = colour_animal();
    let npcs = generate(&schema, 1, &mut RngSource::seeded(42)).unwrap();
    assert_eq!(npcs.len(), 1);

    let npc = &npcs[0];
    let colour = npc.get_trait_names("Colour");
    let animal = npc.get_trait_names("Animal");
    assert_eq!(colour.len(), 1);
    assert_eq!(animal.len(), 1);
    assert!(["Green", "Red"].contains(&colour[0].as_str()));
    assert!(["Gorilla", "Rhino"].contains(&animal[0].as_str()));
}

#[test]
fn same_seed_same_npcs() {
    let schema = colour_animal();
    let a = generate(&schema, 10, &mut RngSource::seeded(7)).unwrap();
    let b = generate(&schema, 10, &mut RngSource::seeded(7)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn sword_grants_an_enchantment() {
    let schema = weapon_schema();
    let generator = Generator::new(&schema).unwrap();

    // Enchantment runs first with no picks of its own. Drawing Sword reopens it.
    let npc = generator.generate_npc(&[], &mut Script::new(&[0, 1])).unwrap();
    assert_eq!(npc.get_trait_names("Weapon"), ["Sword"]);
    assert_eq!(npc.get_trait_names("Enchantment"), ["Frost"]);

    let npc = generator.generate_npc(&[], &mut Script::new(&[1])).unwrap();
    assert_eq!(npc.get_trait_names("Weapon"), ["Club"]);
    assert!(npc.get_trait_names("Enchantment").is_empty());
}

#[test]
fn bonus_into_later_category_adds_to_its_count() {
    let mut class = TraitCategory::new("Class", 1);
    class
        .add_trait(Trait::new("Bard", 1).with_bonus_selection(BonusSelection::new("Song", 2)))
        .unwrap();
    let song = category("Song", 1, &[("Ballad", 1), ("Dirge", 1), ("Shanty", 1)])
        .with_requirement(Requirement::has_trait("Class", "Bard").unwrap());

    let mut schema = TraitSchema::new();
    schema.add_category(class).unwrap();
    schema.add_category(song).unwrap();

    let npc = generate(&schema, 1, &mut RngSource::seeded(3)).unwrap().remove(0);
    assert_eq!(npc.get_trait_names("Song").len(), 3);
}

#[test]
fn requirement_gates_category() {
    let mut schema = TraitSchema::new();
    schema
        .add_category(category("Class", 1, &[("Fighter", 1), ("Wizard", 1)]))
        .unwrap();
    schema
        .add_category(
            category("Spell", 1, &[("Fireball", 1)])
                .with_requirement(Requirement::has_trait("Class", "Wizard").unwrap()),
        )
        .unwrap();
    let generator = Generator::new(&schema).unwrap();
    assert_eq!(generator.traversal_order().collect::<Vec<_>>(), ["Class", "Spell"]);

    let fighter = generator.generate_npc(&[], &mut Script::new(&[0])).unwrap();
    assert!(fighter.get_trait_names("Spell").is_empty());

    let wizard = generator.generate_npc(&[], &mut Script::new(&[1])).unwrap();
    assert_eq!(wizard.get_trait_names("Spell"), ["Fireball"]);
}

#[test]
fn requirement_parsed_from_json() {
    let expr: Expr = serde_json::from_str(
        r#"{"none": [{"has_trait": {"category": "Class", "trait": "Wizard"}}]}"#,
    )
    .unwrap();
    let requirement = Requirement::from_expr(&expr).unwrap();

    let mut schema = TraitSchema::new();
    schema
        .add_category(category("Class", 1, &[("Fighter", 1), ("Wizard", 1)]))
        .unwrap();
    schema
        .add_category(category("Armour", 1, &[("Plate", 1)]).with_requirement(requirement))
        .unwrap();

    let npcs = generate(&schema, 50, &mut RngSource::seeded(11)).unwrap();
    for npc in &npcs {
        let wizard = npc.has_trait(&TraitId::new("Class", "Wizard"));
        assert_eq!(npc.get_trait_names("Armour").is_empty(), wizard);
    }
}

#[test]
fn cycle_through_bonus_selection_is_diagnosed() {
    let a = category("A", 1, &[("x", 1)])
        .with_requirement(Requirement::has_trait("B", "y").unwrap());
    let b = category("B", 1, &[("y", 1)]);
    let mut c = TraitCategory::new("C", 1)
        .with_requirement(Requirement::has_trait("A", "x").unwrap());
    c.add_trait(Trait::new("z", 1).with_bonus_selection(BonusSelection::new("B", 1)))
        .unwrap();

    let mut schema = TraitSchema::new();
    for cat in [a, b, c] {
        schema.add_category(cat).unwrap();
    }

    let diagnostic = schema.has_circular_requirements().unwrap();
    let kinds: Vec<_> = diagnostic.dependencies.iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&DependencyKind::Requirement));
    assert!(kinds.contains(&DependencyKind::BonusSelection));

    let err = Generator::new(&schema).unwrap_err();
    assert!(matches!(err, GenError::CircularRequirements(_)));
}

#[test]
fn hidden_traits_still_satisfy_requirements() {
    let mut secret = TraitCategory::new("Secret", 1);
    secret.add_trait(Trait::new("Vampire", 1).hidden()).unwrap();

    let mut schema = TraitSchema::new();
    schema.add_category(secret).unwrap();
    schema
        .add_category(
            category("Diet", 1, &[("Blood", 1)])
                .with_requirement(Requirement::has_trait("Secret", "Vampire").unwrap()),
        )
        .unwrap();

    let npc = generate(&schema, 1, &mut RngSource::seeded(0)).unwrap().remove(0);
    assert!(npc.get_trait_names("Secret").is_empty());
    assert_eq!(npc.get_trait_names("Diet"), ["Blood"]);
}

#[test]
fn output_names_and_order() {
    let mut schema = TraitSchema::new();
    schema
        .add_category(category("Colour", 1, &[("Green", 1)]).with_output_name("Hue"))
        .unwrap();
    schema
        .add_category(category("Animal", 1, &[("Rhino", 1)]))
        .unwrap();
    schema.set_category_order(vec!["Animal".into(), "Hue".into()]);

    let npc: Npc = generate(&schema, 1, &mut RngSource::seeded(0)).unwrap().remove(0);
    let names: Vec<_> = npc.categories().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Animal", "Hue"]);
    assert_eq!(npc.get_trait_names("Hue"), ["Green"]);
    assert!(npc.get_trait_names("Colour").is_empty());
}

#[test]
fn replacement_keeps_requirements_on_original() {
    let mut schema = colour_animal();
    schema
        .add_replacement(ReplacementSearch::new("Colour", "Green"))
        .unwrap();
    let generator = Generator::new(&schema).unwrap();

    let npc = generator
        .generate_npc(&[Replacement::new("Colour", "Green", "Red")], &mut Script::new(&[0, 0]))
        .unwrap();
    assert_eq!(npc.get_trait_names("Colour"), ["Red"]);
    assert!(npc.has_trait(&TraitId::new("Colour", "Green")));
}

#[test]
fn generators_share_a_schema_across_threads() {
    let schema = colour_animal();
    let generator = Generator::new(&schema).unwrap();

    let batches: Vec<Vec<Npc>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4u64)
            .map(|seed| {
                let generator = &generator;
                scope.spawn(move || {
                    generator
                        .generate(25, &[], &mut RngSource::seeded(seed))
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(batches.len(), 4);
    for (seed, batch) in batches.iter().enumerate() {
        let again = generator
            .generate(25, &[], &mut RngSource::seeded(seed as u64))
            .unwrap();
        assert_eq!(batch, &again);
    }
}
