//! Formulas: an AST root paired with the domain its variables live in.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::assignment::Assignment;
use crate::ast::{self, Ast};
use crate::clause::Clause;
use crate::cnf::Cnf;
use crate::domain::Domain;
use crate::parser::{self, ParseError};
use crate::truthtable::Truthtable;
use crate::tseitin::Tseitin;
use crate::var::VarRef;
use crate::varmap::OutOfRange;

/// A binary connective was applied to formulas from two different domains.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("operands of `{op}` belong to different domains")]
pub struct DomainMismatch {
    /// The connective's print symbol.
    pub op: &'static str,
}

/// A propositional formula over a shared [`Domain`].
///
/// Formulas are immutable after construction; connectives build new
/// formulas that share their operands' subtrees. All reads are safe to use
/// concurrently, and a formula must not outlive its domain (the `Arc`
/// handles take care of that).
#[derive(Clone)]
pub struct Formula {
    domain: Arc<Domain>,
    root: Arc<Ast>,
}

impl Formula {
    /// Parses an infix formula, resolving variables in `domain`.
    ///
    /// See the [parser](crate::parser) documentation for the syntax.
    pub fn parse(input: &str, domain: &Arc<Domain>) -> Result<Formula, ParseError> {
        Ok(Formula {
            domain: Arc::clone(domain),
            root: parser::parse(input, domain)?,
        })
    }

    pub(crate) fn from_ast(root: Arc<Ast>, domain: Arc<Domain>) -> Formula {
        Formula { domain, root }
    }

    /// The domain the formula's variables live in.
    pub fn domain(&self) -> &Arc<Domain> {
        &self.domain
    }

    pub(crate) fn root(&self) -> &Arc<Ast> {
        &self.root
    }

    /// All variables occurring in the formula, ordered by the domain.
    pub fn vars(&self) -> Vec<VarRef> {
        let mut pile = FxHashSet::default();
        self.root.collect_vars(&mut pile);
        self.domain.sort(pile)
    }

    /// Evaluates the formula under the given assignment.
    ///
    /// Fails with [`OutOfRange`] when an unassigned variable is reached;
    /// since `&`, `|` and `>` short-circuit, a partial assignment does not
    /// necessarily fail.
    pub fn eval(&self, assign: &Assignment) -> Result<bool, OutOfRange> {
        self.root.eval(assign)
    }

    /// Replaces the assigned variables by constants and propagates them.
    pub fn simplify(&self, assign: &Assignment) -> Formula {
        Formula {
            domain: Arc::clone(&self.domain),
            root: self.root.simplify(assign),
        }
    }

    /// Simplifies under the empty assignment, collapsing constants and
    /// double negations without touching any variable.
    pub fn simplified(&self) -> Formula {
        self.simplify(&Assignment::new())
    }

    /// The negation of this formula, sharing its subtree.
    pub fn not(&self) -> Formula {
        Formula {
            domain: Arc::clone(&self.domain),
            root: Arc::new(Ast::Not(Arc::clone(&self.root))),
        }
    }

    fn connect(
        &self,
        rhs: &Formula,
        symbol: &'static str,
        build: fn(Arc<Ast>, Arc<Ast>) -> Ast,
    ) -> Result<Formula, DomainMismatch> {
        if !Arc::ptr_eq(&self.domain, &rhs.domain) {
            return Err(DomainMismatch { op: symbol });
        }
        Ok(Formula {
            domain: Arc::clone(&self.domain),
            root: Arc::new(build(Arc::clone(&self.root), Arc::clone(&rhs.root))),
        })
    }

    /// The conjunction of both formulas. Requires the identical domain.
    pub fn and(&self, rhs: &Formula) -> Result<Formula, DomainMismatch> {
        self.connect(rhs, ast::AND.symbol, Ast::And)
    }

    /// The disjunction of both formulas. Requires the identical domain.
    pub fn or(&self, rhs: &Formula) -> Result<Formula, DomainMismatch> {
        self.connect(rhs, ast::OR.symbol, Ast::Or)
    }

    /// The implication `self > rhs`. Requires the identical domain.
    pub fn implies(&self, rhs: &Formula) -> Result<Formula, DomainMismatch> {
        self.connect(rhs, ast::IMPL.symbol, Ast::Impl)
    }

    /// The equivalence `self = rhs`. Requires the identical domain.
    pub fn eqv(&self, rhs: &Formula) -> Result<Formula, DomainMismatch> {
        self.connect(rhs, ast::EQV.symbol, Ast::Eqv)
    }

    /// The contravalence `self ^ rhs`. Requires the identical domain.
    pub fn xor(&self, rhs: &Formula) -> Result<Formula, DomainMismatch> {
        self.connect(rhs, ast::XOR.symbol, Ast::Xor)
    }

    /// Streams the formula's truth table.
    pub fn truthtable(&self) -> Truthtable {
        Truthtable::new(self)
    }

    /// Streams the clauses of an equivalent CNF by truth-table expansion.
    pub fn cnf(&self) -> Cnf {
        Cnf::new(self)
    }

    /// Streams the clauses of the equisatisfiable Tseitin transform.
    pub fn tseitin(&self) -> Tseitin {
        Tseitin::new(self)
    }

    /// Infix form with minimal parentheses; parsing it yields the printed
    /// formula back.
    pub fn to_infix(&self) -> String {
        self.root.to_infix()
    }

    /// Prefix (polish) form.
    pub fn to_prefix(&self) -> String {
        self.root.to_prefix()
    }

    /// Postfix (reverse polish) form.
    pub fn to_postfix(&self) -> String {
        self.root.to_postfix()
    }

    /// The disjunction of the clause's literals as a formula.
    ///
    /// The empty clause becomes `\F`, the identity of disjunction. The
    /// clause's variables must belong to `domain`.
    pub fn from_clause(clause: &Clause, domain: &Arc<Domain>) -> Formula {
        Formula {
            domain: Arc::clone(domain),
            root: clause_ast(clause),
        }
    }

    /// The conjunction of the clauses as a formula, e.g. one read from a
    /// DIMACS CNF file.
    ///
    /// The empty stream becomes `\T`, the identity of conjunction. All
    /// clause variables must belong to `domain`.
    pub fn from_clauses(
        clauses: impl IntoIterator<Item = Clause>,
        domain: &Arc<Domain>,
    ) -> Formula {
        let mut asts: Vec<Arc<Ast>> = clauses.into_iter().map(|cl| clause_ast(&cl)).collect();

        let root = match asts.pop() {
            None => Arc::new(Ast::Const(true)),
            Some(last) => asts
                .into_iter()
                .rev()
                .fold(last, |acc, cl| Arc::new(Ast::And(cl, acc))),
        };
        Formula {
            domain: Arc::clone(domain),
            root,
        }
    }
}

/// Builds the right-leaning disjunction of a clause's literals.
fn clause_ast(clause: &Clause) -> Arc<Ast> {
    let mut lits: Vec<Arc<Ast>> = clause
        .iter()
        .map(|(var, sign)| {
            let var = Arc::new(Ast::Var(var.clone()));
            if sign {
                var
            } else {
                Arc::new(Ast::Not(var))
            }
        })
        .collect();

    match lits.pop() {
        None => Arc::new(Ast::Const(false)),
        Some(last) => lits
            .into_iter()
            .rev()
            .fold(last, |acc, lit| Arc::new(Ast::Or(lit, acc))),
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_infix())
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Formula({})", self.to_infix())
    }
}
