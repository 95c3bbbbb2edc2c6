//! Requirements: boolean gates evaluated against the NPC being generated.
//!
//! A [`Requirement`] owns a small graph of [`LogicalExpression`] nodes
//! addressed by [`ExprId`]. Composite nodes refer to their operands by id,
//! so a node can be shared between several parents. Build one with
//! [`RequirementBuilder`], or lower an owned [`Expr`] tree with
//! [`Requirement::from_expr`].
//!
//! The NPC is always passed to [`Requirement::evaluate`]; a requirement
//! holds no per-NPC state and can be shared across threads.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{LogicError, LogicResult};
use crate::npc::Npc;
use crate::trait_def::TraitId;

/// Index of a node inside one requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

/// One node of a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalExpression {
    /// True when the NPC has the trait.
    HasTrait(TraitId),
    /// True when every operand is true.
    All(Vec<ExprId>),
    /// True when at least one operand is true.
    Any(Vec<ExprId>),
    /// True when no operand is true.
    NoneOf(Vec<ExprId>),
}

impl LogicalExpression {
    fn operands(&self) -> &[ExprId] {
        match self {
            Self::HasTrait(_) => &[],
            Self::All(ops) | Self::Any(ops) | Self::NoneOf(ops) => ops,
        }
    }
}

/// Owned expression tree, the serialized form of a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// The NPC has `trait_name` in `category`.
    HasTrait {
        /// Category of the tested trait.
        category: String,
        /// Name of the tested trait.
        #[serde(rename = "trait")]
        trait_name: String,
    },
    /// Every operand holds.
    All(Vec<Expr>),
    /// At least one operand holds.
    Any(Vec<Expr>),
    /// No operand holds.
    #[serde(rename = "none")]
    NoneOf(Vec<Expr>),
}

impl Expr {
    /// Leaf testing one trait.
    pub fn has_trait(category: impl Into<String>, trait_name: impl Into<String>) -> Self {
        Self::HasTrait {
            category: category.into(),
            trait_name: trait_name.into(),
        }
    }
}

/// Incrementally assembles a [`Requirement`].
#[derive(Debug, Default)]
pub struct RequirementBuilder {
    nodes: Vec<LogicalExpression>,
}

impl RequirementBuilder {
    /// Builder with no expressions.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: LogicalExpression) -> ExprId {
        self.nodes.push(node);
        ExprId(self.nodes.len() - 1)
    }

    /// Leaf testing whether the NPC has `trait_name` in `category`.
    pub fn has_trait(
        &mut self,
        category: impl Into<String>,
        trait_name: impl Into<String>,
    ) -> LogicResult<ExprId> {
        let id = TraitId::new(category, trait_name);
        if id.category.is_empty() || id.name.is_empty() {
            return Err(LogicError::EmptyOperand);
        }
        Ok(self.push(LogicalExpression::HasTrait(id)))
    }

    /// New conjunction without operands.
    pub fn all(&mut self) -> ExprId {
        self.push(LogicalExpression::All(Vec::new()))
    }

    /// New disjunction without operands.
    pub fn any(&mut self) -> ExprId {
        self.push(LogicalExpression::Any(Vec::new()))
    }

    /// New negated disjunction without operands.
    pub fn none(&mut self) -> ExprId {
        self.push(LogicalExpression::NoneOf(Vec::new()))
    }

    /// Append `child` to the operands of `parent`.
    pub fn add_operand(&mut self, parent: ExprId, child: ExprId) -> LogicResult<()> {
        if child.0 >= self.nodes.len() {
            return Err(LogicError::UnknownExpression(child.0));
        }
        if parent == child {
            return Err(LogicError::SelfReference);
        }
        let node = self
            .nodes
            .get_mut(parent.0)
            .ok_or(LogicError::UnknownExpression(parent.0))?;
        match node {
            LogicalExpression::HasTrait(_) => Err(LogicError::NotComposite),
            LogicalExpression::All(ops)
            | LogicalExpression::Any(ops)
            | LogicalExpression::NoneOf(ops) => {
                ops.push(child);
                Ok(())
            }
        }
    }

    /// Finish with `root` as the expression to evaluate.
    pub fn build(self, root: ExprId) -> LogicResult<Requirement> {
        if root.0 >= self.nodes.len() {
            return Err(LogicError::UnknownExpression(root.0));
        }
        Ok(Requirement {
            nodes: self.nodes,
            root,
        })
    }
}

/// A reusable boolean gate over the traits already chosen for an NPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    nodes: Vec<LogicalExpression>,
    root: ExprId,
}

impl Requirement {
    /// Requirement satisfied exactly when the NPC has the given trait.
    pub fn has_trait(
        category: impl Into<String>,
        trait_name: impl Into<String>,
    ) -> LogicResult<Self> {
        let mut builder = RequirementBuilder::new();
        let root = builder.has_trait(category, trait_name)?;
        builder.build(root)
    }

    /// Lower an owned expression tree.
    pub fn from_expr(expr: &Expr) -> LogicResult<Self> {
        let mut builder = RequirementBuilder::new();
        let root = lower(&mut builder, expr)?;
        builder.build(root)
    }

    /// The expression evaluated first.
    pub fn root(&self) -> ExprId {
        self.root
    }

    /// Look up an expression by id.
    pub fn node(&self, id: ExprId) -> Option<&LogicalExpression> {
        self.nodes.get(id.0)
    }

    /// Evaluate against `npc`.
    ///
    /// Every operand is evaluated, so a loop between expressions is
    /// reported no matter which traits the NPC has.
    pub fn evaluate(&self, npc: &Npc) -> LogicResult<bool> {
        let mut on_stack = vec![false; self.nodes.len()];
        self.evaluate_node(self.root, npc, &mut on_stack)
    }

    fn evaluate_node(&self, id: ExprId, npc: &Npc, on_stack: &mut [bool]) -> LogicResult<bool> {
        let node = self
            .nodes
            .get(id.0)
            .ok_or(LogicError::UnknownExpression(id.0))?;
        if on_stack[id.0] {
            return Err(LogicError::InfiniteEvaluationLoop);
        }
        on_stack[id.0] = true;

        let result = match node {
            LogicalExpression::HasTrait(trait_id) => Ok(npc.has_trait(trait_id)),
            LogicalExpression::All(ops) => self
                .evaluate_operands(ops, npc, on_stack)
                .map(|values| values.iter().all(|v| *v)),
            LogicalExpression::Any(ops) => self
                .evaluate_operands(ops, npc, on_stack)
                .map(|values| values.iter().any(|v| *v)),
            LogicalExpression::NoneOf(ops) => self
                .evaluate_operands(ops, npc, on_stack)
                .map(|values| !values.iter().any(|v| *v)),
        };

        on_stack[id.0] = false;
        result
    }

    fn evaluate_operands(
        &self,
        ops: &[ExprId],
        npc: &Npc,
        on_stack: &mut [bool],
    ) -> LogicResult<Vec<bool>> {
        if ops.is_empty() {
            return Err(LogicError::NoOperands);
        }
        ops.iter()
            .map(|op| self.evaluate_node(*op, npc, on_stack))
            .collect()
    }

    /// Every trait tested by an expression reachable from the root.
    pub fn referenced_traits(&self) -> BTreeSet<&TraitId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        let mut traits = BTreeSet::new();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            if std::mem::replace(&mut seen[id.0], true) {
                continue;
            }
            if let LogicalExpression::HasTrait(trait_id) = node {
                traits.insert(trait_id);
            }
            stack.extend(node.operands());
        }
        traits
    }

    /// Names of every category the requirement looks at.
    pub fn referenced_categories(&self) -> BTreeSet<&str> {
        self.referenced_traits()
            .into_iter()
            .map(|id| id.category.as_str())
            .collect()
    }
}

fn lower(builder: &mut RequirementBuilder, expr: &Expr) -> LogicResult<ExprId> {
    let (parent, children) = match expr {
        Expr::HasTrait {
            category,
            trait_name,
        } => return builder.has_trait(category.as_str(), trait_name.as_str()),
        Expr::All(children) => (builder.all(), children),
        Expr::Any(children) => (builder.any(), children),
        Expr::NoneOf(children) => (builder.none(), children),
    };
    for child in children {
        let child = lower(builder, child)?;
        builder.add_operand(parent, child)?;
    }
    Ok(parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npc_with(traits: &[(&str, &str)]) -> Npc {
        let mut npc = Npc::new();
        for (category, name) in traits {
            npc.record_trait(TraitId::new(*category, *name));
        }
        npc
    }

    #[test]
    fn has_trait_leaf() {
        let req = Requirement::has_trait("Class", "Fighter").unwrap();
        assert!(req.evaluate(&npc_with(&[("Class", "Fighter")])).unwrap());
        assert!(!req.evaluate(&npc_with(&[("Class", "Wizard")])).unwrap());
        assert!(!req.evaluate(&npc_with(&[("Race", "Fighter")])).unwrap());
    }

    #[test]
    fn all_any_none() {
        let npc = npc_with(&[("Class", "Fighter"), ("Race", "Elf")]);
        let fighter = Expr::has_trait("Class", "Fighter");
        let dwarf = Expr::has_trait("Race", "Dwarf");
        let elf = Expr::has_trait("Race", "Elf");

        let all = Requirement::from_expr(&Expr::All(vec![fighter.clone(), elf.clone()])).unwrap();
        assert!(all.evaluate(&npc).unwrap());

        let all = Requirement::from_expr(&Expr::All(vec![fighter.clone(), dwarf.clone()])).unwrap();
        assert!(!all.evaluate(&npc).unwrap());

        let any = Requirement::from_expr(&Expr::Any(vec![dwarf.clone(), elf])).unwrap();
        assert!(any.evaluate(&npc).unwrap());

        let none = Requirement::from_expr(&Expr::NoneOf(vec![dwarf.clone()])).unwrap();
        assert!(none.evaluate(&npc).unwrap());

        let none = Requirement::from_expr(&Expr::NoneOf(vec![dwarf, fighter])).unwrap();
        assert!(!none.evaluate(&npc).unwrap());
    }

    #[test]
    fn nested_expressions() {
        // Fighter AND NOT (Dwarf OR Orc)
        let expr = Expr::All(vec![
            Expr::has_trait("Class", "Fighter"),
            Expr::NoneOf(vec![
                Expr::has_trait("Race", "Dwarf"),
                Expr::has_trait("Race", "Orc"),
            ]),
        ]);
        let req = Requirement::from_expr(&expr).unwrap();
        assert!(req.evaluate(&npc_with(&[("Class", "Fighter"), ("Race", "Elf")])).unwrap());
        assert!(!req.evaluate(&npc_with(&[("Class", "Fighter"), ("Race", "Orc")])).unwrap());
    }

    #[test]
    fn reusable_across_npcs() {
        let req = Requirement::has_trait("Class", "Fighter").unwrap();
        let yes = npc_with(&[("Class", "Fighter")]);
        let no = Npc::new();
        for _ in 0..3 {
            assert!(req.evaluate(&yes).unwrap());
            assert!(!req.evaluate(&no).unwrap());
        }
    }

    #[test]
    fn no_operands_is_an_error() {
        let req = Requirement::from_expr(&Expr::Any(vec![])).unwrap();
        assert_eq!(req.evaluate(&Npc::new()), Err(LogicError::NoOperands));

        let nested = Expr::All(vec![Expr::has_trait("A", "x"), Expr::NoneOf(vec![])]);
        let req = Requirement::from_expr(&nested).unwrap();
        assert_eq!(req.evaluate(&Npc::new()), Err(LogicError::NoOperands));
    }

    #[test]
    fn empty_operand_is_rejected() {
        let mut builder = RequirementBuilder::new();
        assert_eq!(builder.has_trait("", "x"), Err(LogicError::EmptyOperand));
        assert_eq!(builder.has_trait("A", ""), Err(LogicError::EmptyOperand));
    }

    #[test]
    fn unknown_operand_is_rejected() {
        let mut other = RequirementBuilder::new();
        other.all();
        other.all();
        let foreign = other.any();

        let mut builder = RequirementBuilder::new();
        let all = builder.all();
        assert_eq!(
            builder.add_operand(all, foreign),
            Err(LogicError::UnknownExpression(2))
        );
        assert!(RequirementBuilder::new().build(foreign).is_err());
    }

    #[test]
    fn self_reference_is_rejected_eagerly() {
        let mut builder = RequirementBuilder::new();
        let all = builder.all();
        assert_eq!(builder.add_operand(all, all), Err(LogicError::SelfReference));
    }

    #[test]
    fn leaf_does_not_accept_operands() {
        let mut builder = RequirementBuilder::new();
        let leaf = builder.has_trait("A", "x").unwrap();
        let other = builder.has_trait("B", "y").unwrap();
        assert_eq!(builder.add_operand(leaf, other), Err(LogicError::NotComposite));
    }

    #[test]
    fn indirect_loop_is_detected() {
        let mut builder = RequirementBuilder::new();
        let a = builder.all();
        let b = builder.any();
        let leaf = builder.has_trait("A", "x").unwrap();
        builder.add_operand(a, leaf).unwrap();
        builder.add_operand(a, b).unwrap();
        builder.add_operand(b, a).unwrap();
        let req = builder.build(a).unwrap();

        // The leaf is false, the loop is still reported.
        assert_eq!(
            req.evaluate(&Npc::new()),
            Err(LogicError::InfiniteEvaluationLoop)
        );
        assert_eq!(req.referenced_categories().into_iter().collect::<Vec<_>>(), ["A"]);
    }

    #[test]
    fn shared_operand_is_not_a_loop() {
        let mut builder = RequirementBuilder::new();
        let leaf = builder.has_trait("A", "x").unwrap();
        let any = builder.any();
        let all = builder.all();
        builder.add_operand(any, leaf).unwrap();
        builder.add_operand(all, leaf).unwrap();
        builder.add_operand(all, any).unwrap();
        let req = builder.build(all).unwrap();
        assert!(req.evaluate(&npc_with(&[("A", "x")])).unwrap());
    }

    #[test]
    fn referenced_categories_collects_all_leaves() {
        let expr = Expr::Any(vec![
            Expr::has_trait("Class", "Fighter"),
            Expr::All(vec![
                Expr::has_trait("Race", "Elf"),
                Expr::has_trait("Class", "Wizard"),
            ]),
        ]);
        let req = Requirement::from_expr(&expr).unwrap();
        assert_eq!(
            req.referenced_categories().into_iter().collect::<Vec<_>>(),
            ["Class", "Race"]
        );
        assert_eq!(req.referenced_traits().len(), 3);
    }

    #[test]
    fn expr_from_json() {
        let json = r#"{"all": [
            {"has_trait": {"category": "Class", "trait": "Fighter"}},
            {"none": [{"has_trait": {"category": "Race", "trait": "Orc"}}]}
        ]}"#;
        let expr: Expr = serde_json::from_str(json).unwrap();
        assert_eq!(
            expr,
            Expr::All(vec![
                Expr::has_trait("Class", "Fighter"),
                Expr::NoneOf(vec![Expr::has_trait("Race", "Orc")]),
            ])
        );
    }
}
