//! CNF clause streams by truth-table expansion.

use std::collections::VecDeque;
use std::sync::Arc;

use log::debug;
use rustc_hash::FxHashSet;

use crate::assignment::Assignment;
use crate::ast::Ast;
use crate::clause::Clause;
use crate::formula::Formula;

/// Lazily enumerates the clauses of a CNF equivalent to a formula.
///
/// All `And` nodes at the top of the AST are flattened first, so the
/// formula splits into a conjunction of And-free subtrees and each subtree
/// gets its own, smaller truth table. Every assignment falsifying a subtree
/// contributes one clause: the bitwise negation of that assignment. A
/// tautological subtree contributes nothing and a `\F` subtree contributes
/// the empty clause.
pub struct Cnf {
    formula: Formula,
    queue: VecDeque<Arc<Ast>>,
    current: Option<(Arc<Ast>, Assignment)>,
}

impl Cnf {
    pub(crate) fn new(formula: &Formula) -> Cnf {
        let mut queue = VecDeque::new();
        flatten_conjunction(formula.root(), &mut queue);
        debug!(
            "cnf expansion of {} and-free subtrees",
            queue.len()
        );
        Cnf {
            formula: formula.clone(),
            queue,
            current: None,
        }
    }

    /// The formula whose CNF is being enumerated.
    pub fn formula(&self) -> &Formula {
        &self.formula
    }
}

/// Collects the non-`And` subtrees of a conjunction, left to right.
fn flatten_conjunction(root: &Arc<Ast>, queue: &mut VecDeque<Arc<Ast>>) {
    match &**root {
        Ast::And(lhs, rhs) => {
            flatten_conjunction(lhs, queue);
            flatten_conjunction(rhs, queue);
        }
        _ => queue.push_back(Arc::clone(root)),
    }
}

impl Iterator for Cnf {
    type Item = Clause;

    fn next(&mut self) -> Option<Clause> {
        loop {
            match &mut self.current {
                None => {
                    let subtree = self.queue.pop_front()?;
                    let mut pile = FxHashSet::default();
                    subtree.collect_vars(&mut pile);
                    let vars = self.formula.domain().sort(pile);
                    self.current = Some((subtree, Assignment::from_vars(vars)));
                }
                Some((subtree, assign)) => {
                    if assign.overflown() {
                        self.current = None;
                        continue;
                    }
                    let value = subtree
                        .eval(assign)
                        .expect("subtree assignments are total");
                    let clause = if value {
                        None
                    } else {
                        Some(
                            assign
                                .iter()
                                .map(|(var, value)| (var.clone(), !value))
                                .collect(),
                        )
                    };
                    assign.increment();
                    if let Some(clause) = clause {
                        return Some(clause);
                    }
                }
            }
        }
    }
}
