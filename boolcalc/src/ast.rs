//! Abstract syntax trees for propositional formulas.
//!
//! Nodes are immutable and shared via `Arc`, so operator constructors and
//! the simplifier can reuse operand subtrees without copying. Operator
//! metadata lives in one constant table; the parser and the printers both
//! consult it, which is what keeps printed formulas re-parseable.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::assignment::Assignment;
use crate::var::VarRef;
use crate::varmap::OutOfRange;

/// Operator associativity.
///
/// Informative metadata: the parser treats every binary operator as
/// right-associative, which is the convention for the one operator where it
/// matters (`>`); the others are associative anyway.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Assoc {
    Non,
    Right,
    Both,
}

/// Metadata of one node variant: print symbol, binding strength, arity and
/// associativity. Higher precedence binds tighter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpInfo {
    pub symbol: &'static str,
    pub prec: u8,
    pub arity: u8,
    pub assoc: Assoc,
}

/// One row per [`Ast`] variant.
pub(crate) const ATOM: OpInfo = OpInfo {
    symbol: "",
    prec: 20,
    arity: 0,
    assoc: Assoc::Non,
};
pub(crate) const NOT: OpInfo = OpInfo {
    symbol: "~",
    prec: 14,
    arity: 1,
    assoc: Assoc::Non,
};
pub(crate) const AND: OpInfo = OpInfo {
    symbol: "&",
    prec: 12,
    arity: 2,
    assoc: Assoc::Both,
};
pub(crate) const OR: OpInfo = OpInfo {
    symbol: "|",
    prec: 10,
    arity: 2,
    assoc: Assoc::Both,
};
pub(crate) const IMPL: OpInfo = OpInfo {
    symbol: ">",
    prec: 8,
    arity: 2,
    assoc: Assoc::Right,
};
pub(crate) const EQV: OpInfo = OpInfo {
    symbol: "=",
    prec: 6,
    arity: 2,
    assoc: Assoc::Both,
};
pub(crate) const XOR: OpInfo = OpInfo {
    symbol: "^",
    prec: 6,
    arity: 2,
    assoc: Assoc::Both,
};

/// A node of a propositional formula.
///
/// Every `Var` node reachable from one formula references the same domain;
/// the [`Formula`](crate::formula::Formula) constructors maintain that
/// invariant.
#[derive(Debug, PartialEq, Eq)]
pub enum Ast {
    Const(bool),
    Var(VarRef),
    Not(Arc<Ast>),
    And(Arc<Ast>, Arc<Ast>),
    Or(Arc<Ast>, Arc<Ast>),
    Impl(Arc<Ast>, Arc<Ast>),
    Eqv(Arc<Ast>, Arc<Ast>),
    Xor(Arc<Ast>, Arc<Ast>),
}

impl Ast {
    /// The metadata row for this node's variant.
    pub fn info(&self) -> &'static OpInfo {
        match self {
            Ast::Const(_) | Ast::Var(_) => &ATOM,
            Ast::Not(_) => &NOT,
            Ast::And(_, _) => &AND,
            Ast::Or(_, _) => &OR,
            Ast::Impl(_, _) => &IMPL,
            Ast::Eqv(_, _) => &EQV,
            Ast::Xor(_, _) => &XOR,
        }
    }

    fn binary(&self) -> Option<(&Arc<Ast>, &Arc<Ast>)> {
        match self {
            Ast::And(lhs, rhs)
            | Ast::Or(lhs, rhs)
            | Ast::Impl(lhs, rhs)
            | Ast::Eqv(lhs, rhs)
            | Ast::Xor(lhs, rhs) => Some((lhs, rhs)),
            _ => None,
        }
    }

    /// Evaluates the subtree under the given assignment.
    ///
    /// `&`, `|` and `>` short-circuit, so evaluation under a partial
    /// assignment can succeed as long as every variable that is actually
    /// reached is assigned. A reached unassigned variable fails with
    /// [`OutOfRange`].
    pub fn eval(&self, assign: &Assignment) -> Result<bool, OutOfRange> {
        Ok(match self {
            Ast::Const(value) => *value,
            Ast::Var(var) => assign.value(var)?,
            Ast::Not(rhs) => !rhs.eval(assign)?,
            Ast::And(lhs, rhs) => lhs.eval(assign)? && rhs.eval(assign)?,
            Ast::Or(lhs, rhs) => lhs.eval(assign)? || rhs.eval(assign)?,
            Ast::Impl(lhs, rhs) => !lhs.eval(assign)? || rhs.eval(assign)?,
            Ast::Eqv(lhs, rhs) => lhs.eval(assign)? == rhs.eval(assign)?,
            Ast::Xor(lhs, rhs) => lhs.eval(assign)? != rhs.eval(assign)?,
        })
    }

    /// Partially evaluates the subtree under the given assignment.
    ///
    /// Assigned variables are replaced by constants and constants are
    /// propagated upwards, so the result is either a sole constant or
    /// contains no constant nodes and none of the assigned variables.
    pub fn simplify(&self, assign: &Assignment) -> Arc<Ast> {
        match self {
            Ast::Const(value) => Arc::new(Ast::Const(*value)),
            Ast::Var(var) => match assign.get(var) {
                Some(value) => Arc::new(Ast::Const(value)),
                None => Arc::new(Ast::Var(var.clone())),
            },
            Ast::Not(rhs) => simplify_not(rhs.simplify(assign)),
            Ast::And(lhs, rhs) => {
                let lhs = lhs.simplify(assign);
                let rhs = rhs.simplify(assign);
                match (&*lhs, &*rhs) {
                    (Ast::Const(false), _) | (_, Ast::Const(false)) => {
                        Arc::new(Ast::Const(false))
                    }
                    (Ast::Const(true), _) => rhs,
                    (_, Ast::Const(true)) => lhs,
                    _ => Arc::new(Ast::And(lhs, rhs)),
                }
            }
            Ast::Or(lhs, rhs) => {
                let lhs = lhs.simplify(assign);
                let rhs = rhs.simplify(assign);
                match (&*lhs, &*rhs) {
                    (Ast::Const(true), _) | (_, Ast::Const(true)) => Arc::new(Ast::Const(true)),
                    (Ast::Const(false), _) => rhs,
                    (_, Ast::Const(false)) => lhs,
                    _ => Arc::new(Ast::Or(lhs, rhs)),
                }
            }
            Ast::Impl(lhs, rhs) => {
                let lhs = lhs.simplify(assign);
                let rhs = rhs.simplify(assign);
                match (&*lhs, &*rhs) {
                    (Ast::Const(false), _) | (_, Ast::Const(true)) => Arc::new(Ast::Const(true)),
                    (Ast::Const(true), _) => rhs,
                    (_, Ast::Const(false)) => simplify_not(lhs),
                    _ => Arc::new(Ast::Impl(lhs, rhs)),
                }
            }
            Ast::Eqv(lhs, rhs) => {
                let lhs = lhs.simplify(assign);
                let rhs = rhs.simplify(assign);
                match (&*lhs, &*rhs) {
                    (Ast::Const(true), _) => rhs,
                    (_, Ast::Const(true)) => lhs,
                    (Ast::Const(false), _) => simplify_not(rhs),
                    (_, Ast::Const(false)) => simplify_not(lhs),
                    _ => Arc::new(Ast::Eqv(lhs, rhs)),
                }
            }
            Ast::Xor(lhs, rhs) => {
                let lhs = lhs.simplify(assign);
                let rhs = rhs.simplify(assign);
                match (&*lhs, &*rhs) {
                    (Ast::Const(false), _) => rhs,
                    (_, Ast::Const(false)) => lhs,
                    (Ast::Const(true), _) => simplify_not(rhs),
                    (_, Ast::Const(true)) => simplify_not(lhs),
                    _ => Arc::new(Ast::Xor(lhs, rhs)),
                }
            }
        }
    }

    /// Collects every variable reachable from this subtree into `pile`.
    pub(crate) fn collect_vars(&self, pile: &mut FxHashSet<VarRef>) {
        let mut todo: VecDeque<&Ast> = VecDeque::new();
        todo.push_back(self);
        while let Some(node) = todo.pop_front() {
            match node {
                Ast::Const(_) => {}
                Ast::Var(var) => {
                    pile.insert(var.clone());
                }
                Ast::Not(rhs) => todo.push_back(rhs),
                _ => {
                    if let Some((lhs, rhs)) = node.binary() {
                        todo.push_back(lhs);
                        todo.push_back(rhs);
                    }
                }
            }
        }
    }

    /// Converts the subtree to infix with minimal parentheses.
    ///
    /// A child is parenthesized iff it binds weaker than this node. Since
    /// parsing is right-associative, equal-precedence children never need
    /// parentheses for the output to re-parse to the same printed form.
    pub fn to_infix(&self) -> String {
        match self {
            Ast::Const(value) => const_token(*value).to_string(),
            Ast::Var(var) => var.to_string(),
            Ast::Not(rhs) => {
                if rhs.info().prec < self.info().prec {
                    format!("~({})", rhs.to_infix())
                } else {
                    format!("~{}", rhs.to_infix())
                }
            }
            _ => {
                let info = self.info();
                let (lhs, rhs) = match self.binary() {
                    Some(operands) => operands,
                    None => unreachable!(),
                };
                let mut lhs_str = lhs.to_infix();
                if lhs.info().prec < info.prec {
                    lhs_str = format!("({})", lhs_str);
                }
                let mut rhs_str = rhs.to_infix();
                if rhs.info().prec < info.prec {
                    rhs_str = format!("({})", rhs_str);
                }
                format!("{} {} {}", lhs_str, info.symbol, rhs_str)
            }
        }
    }

    /// Converts the subtree to prefix (polish) notation.
    pub fn to_prefix(&self) -> String {
        match self {
            Ast::Const(value) => const_token(*value).to_string(),
            Ast::Var(var) => var.to_string(),
            Ast::Not(rhs) => format!("~ {}", rhs.to_prefix()),
            _ => match self.binary() {
                Some((lhs, rhs)) => format!(
                    "{} {} {}",
                    self.info().symbol,
                    lhs.to_prefix(),
                    rhs.to_prefix()
                ),
                None => unreachable!(),
            },
        }
    }

    /// Converts the subtree to postfix (reverse polish) notation.
    pub fn to_postfix(&self) -> String {
        match self {
            Ast::Const(value) => const_token(*value).to_string(),
            Ast::Var(var) => var.to_string(),
            Ast::Not(rhs) => format!("{} ~", rhs.to_postfix()),
            _ => match self.binary() {
                Some((lhs, rhs)) => format!(
                    "{} {} {}",
                    lhs.to_postfix(),
                    rhs.to_postfix(),
                    self.info().symbol
                ),
                None => unreachable!(),
            },
        }
    }
}

fn const_token(value: bool) -> &'static str {
    if value {
        "\\T"
    } else {
        "\\F"
    }
}

/// Negates an already simplified subtree.
///
/// Steps past all leading `Not` nodes first and only then checks for a
/// constant, so the parity of the collapsed negations is computed over the
/// unchanged children.
fn simplify_not(child: Arc<Ast>) -> Arc<Ast> {
    let mut toggles = 1usize;
    let mut cur = child;
    while let Ast::Not(inner) = &*cur {
        let inner = inner.clone();
        cur = inner;
        toggles += 1;
    }
    if toggles % 2 == 0 {
        return cur;
    }
    if let Ast::Const(value) = &*cur {
        return Arc::new(Ast::Const(!value));
    }
    Arc::new(Ast::Not(cur))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    fn var(domain: &Domain, name: &str) -> Arc<Ast> {
        Arc::new(Ast::Var(domain.resolve(name).unwrap()))
    }

    #[test]
    fn eval_short_circuits_missing_variables() {
        let domain = Domain::new();
        let a = domain.resolve("a").unwrap();
        let ast = Ast::Impl(var(&domain, "a"), var(&domain, "b"));

        let mut assign = Assignment::from_vars(vec![a.clone()]);
        // a = false short-circuits the implication, b is never reached.
        assert_eq!(ast.eval(&assign), Ok(true));

        assign.set(a, true);
        assert_eq!(ast.eval(&assign), Err(OutOfRange("b".to_string())));
    }

    #[test]
    fn simplify_collapses_double_negation() {
        let domain = Domain::new();
        let ast = Ast::Not(Arc::new(Ast::Not(Arc::new(Ast::Not(var(&domain, "a"))))));

        assert_eq!(ast.simplify(&Assignment::new()).to_postfix(), "[a] ~");
    }

    #[test]
    fn simplify_implication_with_false_conclusion() {
        let domain = Domain::new();
        let b = domain.resolve("b").unwrap();
        let ast = Ast::Impl(var(&domain, "a"), var(&domain, "b"));

        let mut assign = Assignment::new();
        assign.set(b, false);
        assert_eq!(ast.simplify(&assign).to_postfix(), "[a] ~");
    }

    #[test]
    fn simplify_equivalence_and_contravalence_are_dual() {
        let domain = Domain::new();
        let a = domain.resolve("a").unwrap();

        let eqv = Ast::Eqv(var(&domain, "a"), var(&domain, "b"));
        let xor = Ast::Xor(var(&domain, "a"), var(&domain, "b"));

        let mut assign = Assignment::new();
        assign.set(a.clone(), true);
        assert_eq!(eqv.simplify(&assign).to_postfix(), "[b]");
        assert_eq!(xor.simplify(&assign).to_postfix(), "[b] ~");

        let mut assign = Assignment::new();
        assign.set(a, false);
        assert_eq!(eqv.simplify(&assign).to_postfix(), "[b] ~");
        assert_eq!(xor.simplify(&assign).to_postfix(), "[b]");
    }

    #[test]
    fn simplify_keeps_unassigned_structure() {
        let domain = Domain::new();
        let ast = Ast::And(
            Arc::new(Ast::Or(var(&domain, "a"), var(&domain, "b"))),
            var(&domain, "c"),
        );

        let simplified = ast.simplify(&Assignment::new());
        assert_eq!(simplified.to_postfix(), "[a] [b] | [c] &");
    }

    #[test]
    fn infix_parenthesizes_weaker_children_only() {
        let domain = Domain::new();
        let a = var(&domain, "a");
        let b = var(&domain, "b");
        let c = var(&domain, "c");

        let and_of_or = Ast::And(Arc::new(Ast::Or(a.clone(), b.clone())), c.clone());
        assert_eq!(and_of_or.to_infix(), "([a] | [b]) & [c]");

        let or_of_and = Ast::Or(a.clone(), Arc::new(Ast::And(b.clone(), c.clone())));
        assert_eq!(or_of_and.to_infix(), "[a] | [b] & [c]");

        let not_of_and = Ast::Not(Arc::new(Ast::And(a.clone(), b.clone())));
        assert_eq!(not_of_and.to_infix(), "~([a] & [b])");

        let chain = Ast::Impl(a, Arc::new(Ast::Impl(b, c)));
        assert_eq!(chain.to_infix(), "[a] > [b] > [c]");
    }

    #[test]
    fn prefix_and_postfix_mirror_each_other() {
        let domain = Domain::new();
        let ast = Ast::Xor(
            Arc::new(Ast::Not(var(&domain, "a"))),
            Arc::new(Ast::Const(true)),
        );

        assert_eq!(ast.to_prefix(), "^ ~ [a] \\T");
        assert_eq!(ast.to_postfix(), "[a] ~ \\T ^");
    }
}
