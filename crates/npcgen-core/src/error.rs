//! Error types for schema resolution and NPC generation.

use crate::schema::CycleDiagnostic;

/// Convenience result type for schema and generation operations.
pub type GenResult<T> = Result<T, GenError>;

/// Convenience result type for requirement expressions.
pub type LogicResult<T> = Result<T, LogicError>;

/// Errors caused by a malformed schema or a violated precondition.
///
/// All of these are fatal: generation stops rather than producing a
/// partially built NPC.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A category with the same name is already part of the schema.
    #[error("category already exists: \"{0}\"")]
    DuplicateCategory(String),

    /// A trait with the same name is already part of the category.
    #[error("trait \"{trait_name}\" already exists in category \"{category}\"")]
    DuplicateTrait {
        /// The category being built.
        category: String,
        /// The repeated trait name.
        trait_name: String,
    },

    /// A requirement, bonus selection or display order names a missing category.
    #[error("unknown category: \"{0}\"")]
    UnknownCategory(String),

    /// A requirement or replacement names a trait missing from its category.
    #[error("unknown trait \"{trait_name}\" in category \"{category}\"")]
    UnknownTrait {
        /// The category that was searched.
        category: String,
        /// The missing trait name.
        trait_name: String,
    },

    /// A bonus selection grants no picks.
    #[error("bonus selection from \"{source_category}\" into \"{target}\" must grant at least one pick")]
    InvalidBonusSelection {
        /// The category owning the granting trait.
        source_category: String,
        /// The category receiving the picks.
        target: String,
    },

    /// More picks were requested than traits remain in the pool.
    #[error(
        "category \"{category}\" needs {requested} selection(s) but only {available} trait(s) are available"
    )]
    InsufficientTraits {
        /// The category being resolved.
        category: String,
        /// Number of picks requested.
        requested: u32,
        /// Number of traits left to draw from.
        available: usize,
    },

    /// Base and bonus picks for one category add up past `u32::MAX`.
    #[error("selection count of category \"{category}\" overflows")]
    SelectionCountOverflow {
        /// The category receiving the picks.
        category: String,
    },

    /// A draw was required from a pool whose weights sum to zero.
    #[error("category \"{0}\" has no trait with a positive weight left to select")]
    ZeroTotalWeight(String),

    /// The category dependency graph contains a cycle.
    #[error("circular requirements: {0}")]
    CircularRequirements(CycleDiagnostic),

    /// A replacement targets a trait the schema does not declare as replaceable.
    #[error("trait \"{trait_name}\" in category \"{category}\" is not replaceable")]
    UnknownReplacement {
        /// Category of the searched trait.
        category: String,
        /// The searched trait name.
        trait_name: String,
    },

    /// A replacement substitutes a name that is not a trait of the same category.
    #[error("\"{replacement}\" is not a trait of category \"{category}\"")]
    InvalidReplacement {
        /// Category of the searched trait.
        category: String,
        /// The rejected replacement name.
        replacement: String,
    },

    /// The display order names an output name no category uses.
    #[error("category order names unknown output \"{0}\"")]
    UnknownOutputName(String),

    /// A requirement expression could not be built or evaluated.
    #[error(transparent)]
    Logic(#[from] LogicError),
}

/// Errors in requirement logic.
///
/// Kept apart from [`GenError`] so a caller can tell a well-formed schema
/// with looping requirement logic from a malformed schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogicError {
    /// A composite expression was evaluated without any operands.
    #[error("logical expression has no operands")]
    NoOperands,

    /// A trait test was built with an empty category or trait name.
    #[error("trait test needs a non-empty category and trait name")]
    EmptyOperand,

    /// An expression id does not belong to this requirement.
    #[error("unknown expression id {0}")]
    UnknownExpression(usize),

    /// An expression was added as an operand of itself.
    #[error("logical expression cannot contain itself")]
    SelfReference,

    /// Operands can only be added to ALL, ANY and NONE expressions.
    #[error("only composite expressions accept operands")]
    NotComposite,

    /// Expressions contain each other, so evaluation would never finish.
    #[error("infinite evaluation loop in requirement")]
    InfiniteEvaluationLoop,
}
