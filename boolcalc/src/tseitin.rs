//! Tseitin transform clause streams.

use std::collections::VecDeque;
use std::sync::Arc;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::assignment::Assignment;
use crate::ast::Ast;
use crate::clause::Clause;
use crate::domain::Domain;
use crate::formula::Formula;
use crate::var::VarRef;
use crate::varmap::OutOfRange;

/// One structurally distinct subformula with its auxiliary variable and the
/// auxiliaries of its direct children.
struct Node {
    aux: VarRef,
    ast: Arc<Ast>,
    operands: Vec<VarRef>,
}

/// Lazily enumerates the clauses of a formula's Tseitin transform, an
/// equisatisfiable CNF whose size is linear in the formula.
///
/// Every structurally distinct subformula gets one auxiliary variable,
/// interned in a separate domain under the subformula's infix form. The
/// infix form identifies the subformula uniquely (minimal-parenthesis
/// printing is injective), so equal subformulas share their auxiliary.
/// Variable names containing `]` would break that uniqueness; the parser
/// cannot produce such names, only direct `resolve` calls can.
/// The first clause constrains the root auxiliary to true; after that the
/// subformulas are visited in breadth-first order and each emits the
/// clauses encoding `aux ↔ op(children's auxes)`. A clause that would
/// contain the same auxiliary both positively and negatively is vacuously
/// true and is omitted.
pub struct Tseitin {
    formula: Formula,
    aux: Arc<Domain>,
    nodes: Vec<Node>,
    index: usize,
    pending: VecDeque<Clause>,
}

fn children(ast: &Ast) -> Vec<&Arc<Ast>> {
    match ast {
        Ast::Const(_) | Ast::Var(_) => Vec::new(),
        Ast::Not(rhs) => vec![rhs],
        Ast::And(lhs, rhs)
        | Ast::Or(lhs, rhs)
        | Ast::Impl(lhs, rhs)
        | Ast::Eqv(lhs, rhs)
        | Ast::Xor(lhs, rhs) => vec![lhs, rhs],
    }
}

impl Tseitin {
    pub(crate) fn new(formula: &Formula) -> Tseitin {
        let aux = Arc::new(Domain::new());
        let mut by_name: FxHashMap<String, VarRef> = FxHashMap::default();
        let mut intern = |name: String| -> VarRef {
            if let Some(var) = by_name.get(&name) {
                return var.clone();
            }
            let var = aux
                .resolve(&name)
                .expect("fresh tseitin domain is never frozen");
            by_name.insert(name, var.clone());
            var
        };

        // Breadth-first walk, visiting each structurally distinct
        // subformula once. The interning order of the auxiliaries is the
        // node order, which `lift` relies on.
        let mut nodes: Vec<Node> = Vec::new();
        let mut seen: FxHashSet<VarRef> = FxHashSet::default();
        let mut queue: VecDeque<Arc<Ast>> = VecDeque::new();
        queue.push_back(Arc::clone(formula.root()));
        while let Some(ast) = queue.pop_front() {
            let var = intern(ast.to_infix());
            if !seen.insert(var.clone()) {
                continue;
            }
            let operands = children(&ast)
                .into_iter()
                .map(|child| intern(child.to_infix()))
                .collect();
            for child in children(&ast) {
                queue.push_back(Arc::clone(child));
            }
            nodes.push(Node {
                aux: var,
                ast,
                operands,
            });
        }
        debug!(
            "tseitin transform: {} auxiliary variables for {} source variables",
            nodes.len(),
            formula.vars().len()
        );

        // Require that the root subformula be true.
        let mut pending = VecDeque::new();
        let mut root_unit = Clause::new();
        root_unit.set(nodes[0].aux.clone(), true);
        pending.push_back(root_unit);

        Tseitin {
            formula: formula.clone(),
            aux,
            nodes,
            index: 0,
            pending,
        }
    }

    /// The domain of the auxiliary variables.
    pub fn domain(&self) -> &Arc<Domain> {
        &self.aux
    }

    /// The formula being transformed.
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Lifts an assignment on the source domain to the consistent
    /// assignment on the auxiliary domain: every auxiliary takes the value
    /// of its subformula under `assign`.
    ///
    /// Fails with [`OutOfRange`] when `assign` misses a variable some
    /// subformula needs.
    pub fn lift(&self, assign: &Assignment) -> Result<Assignment, OutOfRange> {
        self.nodes
            .iter()
            .map(|node| Ok((node.aux.clone(), node.ast.eval(assign)?)))
            .collect()
    }

    /// Reads the source-domain assignment back out of an auxiliary-domain
    /// assignment via the auxiliaries of the `Var` subformulas.
    ///
    /// An auxiliary assignment `lifted` is consistent if and only if
    /// `lift(project(lifted))` reproduces it.
    pub fn project(&self, lifted: &Assignment) -> Result<Assignment, OutOfRange> {
        let mut pairs = Vec::new();
        for node in &self.nodes {
            if let Ast::Var(source) = &*node.ast {
                pairs.push((source.clone(), lifted.value(&node.aux)?));
            }
        }
        Ok(pairs.into_iter().collect())
    }
}

fn clause(literals: &[(&VarRef, bool)]) -> Clause {
    literals
        .iter()
        .map(|&(var, sign)| (var.clone(), sign))
        .collect()
}

impl Iterator for Tseitin {
    type Item = Clause;

    fn next(&mut self) -> Option<Clause> {
        loop {
            if let Some(next) = self.pending.pop_front() {
                return Some(next);
            }
            let node = self.nodes.get(self.index)?;
            self.index += 1;

            let c = &node.aux;
            let pending = &mut self.pending;
            match &*node.ast {
                Ast::Const(value) => {
                    pending.push_back(clause(&[(c, *value)]));
                }
                // The auxiliary is the variable's analogue, no constraint.
                Ast::Var(_) => {}
                Ast::Not(_) => {
                    let a = &node.operands[0];
                    pending.push_back(clause(&[(a, false), (c, false)]));
                    pending.push_back(clause(&[(a, true), (c, true)]));
                }
                Ast::And(_, _) => {
                    let (a, b) = (&node.operands[0], &node.operands[1]);
                    pending.push_back(clause(&[(a, false), (b, false), (c, true)]));
                    pending.push_back(clause(&[(a, true), (c, false)]));
                    pending.push_back(clause(&[(b, true), (c, false)]));
                }
                Ast::Or(_, _) => {
                    let (a, b) = (&node.operands[0], &node.operands[1]);
                    pending.push_back(clause(&[(a, true), (b, true), (c, false)]));
                    pending.push_back(clause(&[(a, false), (c, true)]));
                    pending.push_back(clause(&[(b, false), (c, true)]));
                }
                Ast::Impl(_, _) => {
                    let (a, b) = (&node.operands[0], &node.operands[1]);
                    if a != b {
                        pending.push_back(clause(&[(a, false), (b, true), (c, false)]));
                    }
                    pending.push_back(clause(&[(a, true), (c, true)]));
                    pending.push_back(clause(&[(b, false), (c, true)]));
                }
                Ast::Eqv(_, _) => {
                    let (a, b) = (&node.operands[0], &node.operands[1]);
                    pending.push_back(clause(&[(a, false), (b, false), (c, true)]));
                    pending.push_back(clause(&[(a, true), (b, true), (c, true)]));
                    if a != b {
                        pending.push_back(clause(&[(a, true), (b, false), (c, false)]));
                        pending.push_back(clause(&[(a, false), (b, true), (c, false)]));
                    }
                }
                Ast::Xor(_, _) => {
                    let (a, b) = (&node.operands[0], &node.operands[1]);
                    pending.push_back(clause(&[(a, false), (b, false), (c, false)]));
                    pending.push_back(clause(&[(a, true), (b, true), (c, false)]));
                    if a != b {
                        pending.push_back(clause(&[(a, true), (b, false), (c, true)]));
                        pending.push_back(clause(&[(a, false), (b, true), (c, true)]));
                    }
                }
            }
        }
    }
}
