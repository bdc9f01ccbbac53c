//! Disjunctive clauses of literals.

use std::fmt;
use std::iter::FromIterator;

use crate::assignment::Assignment;
use crate::var::VarRef;
use crate::varmap::VarMap;

/// A clause: a set of literals interpreted as their disjunction.
///
/// A variable mapped to `true` occurs as a positive literal, one mapped to
/// `false` as a negative literal. Put another way, the value a variable maps
/// to is the assignment to that variable which would satisfy the clause.
/// A variable occurs at most once, so a clause can never contain a literal
/// together with its negation; the empty clause is unsatisfiable.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Clause {
    map: VarMap,
}

impl Clause {
    /// Creates the empty clause, which no assignment satisfies.
    pub fn new() -> Clause {
        Clause::default()
    }

    /// Creates the all-negative clause on the given variables.
    pub fn from_vars(vars: impl IntoIterator<Item = VarRef>) -> Clause {
        Clause {
            map: VarMap::from_vars(vars),
        }
    }

    /// Whether the variable occurs in the clause, with either sign.
    pub fn exists(&self, var: &VarRef) -> bool {
        self.map.exists(var)
    }

    /// The clause's variables in insertion order.
    pub fn vars(&self) -> &[VarRef] {
        self.map.vars()
    }

    /// Number of literals.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The sign of the variable's literal, if it occurs.
    pub fn get(&self, var: &VarRef) -> Option<bool> {
        self.map.get(var)
    }

    /// Adds the literal for `var` with the given sign, replacing an earlier
    /// sign for the same variable.
    pub fn set(&mut self, var: VarRef, sign: bool) {
        self.map.set(var, sign);
    }

    /// The clause with all literal signs flipped.
    pub fn negate(&self) -> Clause {
        Clause {
            map: self
                .map
                .iter()
                .map(|(var, sign)| (var.clone(), !sign))
                .collect(),
        }
    }

    /// Whether the assignment satisfies the clause, i.e. agrees with at
    /// least one of its literals.
    pub fn satisfied_by(&self, assign: &Assignment) -> bool {
        self.iter().any(|(var, sign)| assign.get(var) == Some(sign))
    }

    /// Iterates over `(variable, sign)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&VarRef, bool)> {
        self.map.iter()
    }
}

impl FromIterator<(VarRef, bool)> for Clause {
    fn from_iter<I: IntoIterator<Item = (VarRef, bool)>>(literals: I) -> Clause {
        Clause {
            map: literals.into_iter().collect(),
        }
    }
}

/// Prints literals by name, e.g. `{ a -b }`.
impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{ ")?;
        for (var, sign) in self.iter() {
            write!(f, "{}{} ", if sign { "" } else { "-" }, var.name())?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
