//! Core of npcgen: trait schemas, dependency resolution, and weighted
//! trait selection.
//!
//! A [`TraitSchema`] describes categories of traits, the requirements that
//! gate them, and the bonus selections some traits grant. A [`Generator`]
//! validates the schema once, orders the categories so every category runs
//! after the ones it depends on, and then produces [`Npc`]s from any
//! [`RandomSource`].

/// Trait categories and their selection counts.
pub mod category;
/// Weighted sampling without replacement.
pub mod chooser;
/// Generic directed graph with cycle detection and topological order.
pub mod digraph;
/// Error types used throughout the crate.
pub mod error;
/// Summary of the optional capabilities a schema uses.
pub mod features;
/// Generation configuration and the NPC generation engine.
pub mod generator;
/// Generated NPCs.
pub mod npc;
/// Injected randomness.
pub mod random;
/// Display-time renaming of chosen traits.
pub mod replacement;
/// Logical expressions over chosen traits.
pub mod requirement;
/// The trait schema and its dependency graph.
pub mod schema;
/// Traits, trait identifiers, and bonus selections.
pub mod trait_def;

/// Re-export category types.
pub use category::TraitCategory;
/// Re-export error types.
pub use error::{GenError, GenResult, LogicError, LogicResult};
/// Re-export capability flags.
pub use features::Features;
/// Re-export the generation engine.
pub use generator::{GenConfig, Generator, generate};
/// Re-export NPC types.
pub use npc::{Npc, NpcCategory};
/// Re-export random sources.
pub use random::{RandomSource, RngSource};
/// Re-export replacement types.
pub use replacement::{Replacement, ReplacementSearch};
/// Re-export requirement types.
pub use requirement::{Expr, Requirement, RequirementBuilder};
/// Re-export schema types.
pub use schema::{CycleDiagnostic, Dependency, DependencyKind, TraitSchema};
/// Re-export trait types.
pub use trait_def::{BonusSelection, Trait, TraitId};
