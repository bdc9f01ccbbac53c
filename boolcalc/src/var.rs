//! Variables and interned variable handles.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The 1-based number a [`Domain`](crate::domain::Domain) assigns to each of
/// its variables.
///
/// Variable numbers are dense: a domain of size `n` uses exactly the numbers
/// `1..=n`, in interning order. The number `0` is reserved as invalid, which
/// allows signed encodings (as in DIMACS CNF) to use the sign for negation.
pub type VarNr = u32;

/// A named propositional variable.
///
/// Variables are owned by the domain that interned them and carry the number
/// the domain assigned at that point. They are only handed out wrapped in a
/// [`VarRef`].
#[derive(Debug)]
pub struct Variable {
    name: String,
    nr: VarNr,
}

impl Variable {
    pub(crate) fn new(name: String, nr: VarNr) -> Variable {
        Variable { name, nr }
    }

    /// The name the variable was interned under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The 1-based number within the owning domain.
    pub fn nr(&self) -> VarNr {
        self.nr
    }
}

/// A cheap, clonable handle to an interned [`Variable`].
///
/// Equality and hashing use the identity of the interned variable, not its
/// name: two domains may coin variables with equal names and those handles
/// compare unequal. Within one domain, `resolve` returns the identical
/// handle for the same name, so identity comparison is exactly name
/// comparison there.
#[derive(Clone)]
pub struct VarRef(Arc<Variable>);

impl VarRef {
    pub(crate) fn new(name: String, nr: VarNr) -> VarRef {
        VarRef(Arc::new(Variable::new(name, nr)))
    }

    /// The name the variable was interned under.
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// The 1-based number within the owning domain.
    #[inline]
    pub fn nr(&self) -> VarNr {
        self.0.nr()
    }
}

impl PartialEq for VarRef {
    #[inline]
    fn eq(&self, other: &VarRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for VarRef {}

impl Hash for VarRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

/// Prints the bracketed form used by the formula syntax, e.g. `[rain]`.
impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.name())
    }
}

impl fmt::Debug for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]#{}", self.name(), self.nr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_not_name_equality() {
        let a = VarRef::new("x".to_string(), 1);
        let b = VarRef::new("x".to_string(), 1);

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.name(), b.name());
    }

    #[test]
    fn display_brackets() {
        let v = VarRef::new("Once upon a Time...".to_string(), 3);
        assert_eq!(v.to_string(), "[Once upon a Time...]");
    }
}
