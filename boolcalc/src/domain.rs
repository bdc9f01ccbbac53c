//! Variable domains: interning, numbering and ordering.
//!
//! A [`Domain`] is the universe of variables for one or more formulas. It
//! interns variables by name, assigns each a dense 1-based [`VarNr`] and
//! provides the total order that all clause and assignment enumeration in
//! this crate follows. The index bijection (`pack`/`unpack`) is what bridges
//! named variables and the integer-based DIMACS CNF encoding.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::var::{VarNr, VarRef};

/// Errors raised by domain lookups and mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The domain is frozen and the request would have interned a new
    /// variable.
    #[error("domain is frozen")]
    Frozen,
    /// A variable number of `0` was passed to [`Domain::unpack`].
    #[error("variable number must be at least 1")]
    InvalidVarNr,
}

#[derive(Default)]
struct Inner {
    by_name: FxHashMap<String, VarRef>,
    by_nr: Vec<VarRef>,
    frozen: bool,
}

impl Inner {
    /// Interns a new variable under the next free number.
    ///
    /// If the name is already taken the existing binding is kept, so the
    /// freshly numbered variable is only reachable via `unpack`. This
    /// matters for auto-vivified decimal names that collide with a name
    /// interned earlier.
    fn new_variable(&mut self, name: &str) -> Result<VarRef, DomainError> {
        if self.frozen {
            return Err(DomainError::Frozen);
        }
        let var = VarRef::new(name.to_string(), self.by_nr.len() as VarNr + 1);
        self.by_nr.push(var.clone());
        self.by_name
            .entry(name.to_string())
            .or_insert_with(|| var.clone());
        Ok(var)
    }
}

/// An ordered, growable universe of variables.
///
/// All operations take `&self`; the internal state is protected by a mutex,
/// so a domain wrapped in an `Arc` can be shared between formulas and
/// threads. A domain can be [frozen](Domain::freeze) to reject any request
/// that would intern a new variable, and [thawed](Domain::thaw) again.
#[derive(Default)]
pub struct Domain {
    inner: Mutex<Inner>,
}

impl Domain {
    /// Creates an empty domain.
    pub fn new() -> Domain {
        Domain::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the plain interning tables
        // intact, so poisoning carries no information here.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the variable interned under `name`, interning it first if it
    /// is unknown.
    ///
    /// Fails with [`DomainError::Frozen`] if the name is new and the domain
    /// is frozen.
    pub fn resolve(&self, name: &str) -> Result<VarRef, DomainError> {
        let mut inner = self.lock();
        if let Some(var) = inner.by_name.get(name) {
            return Ok(var.clone());
        }
        inner.new_variable(name)
    }

    /// Converts a variable to its 1-based number.
    #[inline]
    pub fn pack(&self, var: &VarRef) -> VarNr {
        var.nr()
    }

    /// Converts a 1-based number back to the variable.
    ///
    /// Numbers beyond the current size auto-vivify variables named after
    /// their decimal number (`"size+1"`, …, `"nr"`), so that any DIMACS
    /// input can be read into a fresh domain. Fails with
    /// [`DomainError::InvalidVarNr`] for `0` and with
    /// [`DomainError::Frozen`] if vivification would be needed on a frozen
    /// domain.
    pub fn unpack(&self, nr: VarNr) -> Result<VarRef, DomainError> {
        if nr == 0 {
            return Err(DomainError::InvalidVarNr);
        }
        let mut inner = self.lock();
        while inner.by_nr.len() < nr as usize {
            let name = (inner.by_nr.len() as VarNr + 1).to_string();
            inner.new_variable(&name)?;
        }
        Ok(inner.by_nr[nr as usize - 1].clone())
    }

    /// All variables of the domain, ordered by their number.
    pub fn list(&self) -> Vec<VarRef> {
        self.lock().by_nr.clone()
    }

    /// Number of variables interned so far.
    pub fn size(&self) -> usize {
        self.lock().by_nr.len()
    }

    /// Orders the given variables by their number, dropping duplicates.
    ///
    /// This walks the whole domain once, selecting members, so it is linear
    /// in the domain size rather than `n log n` in the input.
    pub fn sort(&self, vars: impl IntoIterator<Item = VarRef>) -> Vec<VarRef> {
        let pile: FxHashSet<VarRef> = vars.into_iter().collect();
        self.lock()
            .by_nr
            .iter()
            .filter(|var| pile.contains(var))
            .cloned()
            .collect()
    }

    /// Rejects all further interning until [`thaw`](Domain::thaw)ed.
    ///
    /// Known names and numbers still resolve.
    pub fn freeze(&self) {
        self.lock().frozen = true;
    }

    /// Allows interning again after a [`freeze`](Domain::freeze).
    pub fn thaw(&self) {
        self.lock().frozen = false;
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Domain")
            .field("size", &inner.by_nr.len())
            .field("frozen", &inner.frozen)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_consistent() {
        let domain = Domain::new();
        let v3 = domain.resolve("3").unwrap();
        let v3_4 = domain.resolve("3_4").unwrap();
        let v_ = domain.resolve("_").unwrap();
        let vonce = domain.resolve("Once upon a Time...").unwrap();

        assert_eq!(domain.size(), 4);
        assert_eq!(domain.resolve("3").unwrap(), v3);
        assert_eq!(domain.resolve("3_4").unwrap(), v3_4);
        assert_eq!(domain.resolve("_").unwrap(), v_);
        assert_eq!(domain.resolve("Once upon a Time...").unwrap(), vonce);
        assert_eq!(domain.size(), 4);
    }

    #[test]
    fn pack_unpack_bijection() {
        let domain = Domain::new();
        for name in &["a", "b", "c", "d"] {
            domain.resolve(name).unwrap();
        }

        for nr in 1..=4 {
            let var = domain.unpack(nr).unwrap();
            assert_eq!(domain.pack(&var), nr);
        }
        for var in domain.list() {
            assert_eq!(domain.unpack(domain.pack(&var)).unwrap(), var);
        }
        assert_eq!(domain.unpack(0), Err(DomainError::InvalidVarNr));
    }

    #[test]
    fn list_follows_interning_order() {
        let domain = Domain::new();
        let names = ["z", "m", "a"];
        let vars: Vec<_> = names
            .iter()
            .map(|name| domain.resolve(name).unwrap())
            .collect();

        assert_eq!(domain.list(), vars);
        assert_eq!(
            domain.sort(vec![vars[2].clone(), vars[0].clone()]),
            vec![vars[0].clone(), vars[2].clone()]
        );
    }

    #[test]
    fn unpack_vivifies_decimal_names() {
        let domain = Domain::new();
        domain.resolve("x").unwrap();

        let v5 = domain.unpack(5).unwrap();
        assert_eq!(domain.size(), 5);
        assert_eq!(v5.name(), "5");
        assert_eq!(domain.unpack(2).unwrap().name(), "2");
        assert_eq!(domain.resolve("4").unwrap(), domain.unpack(4).unwrap());
    }

    #[test]
    fn vivified_name_collision_keeps_first_binding() {
        let domain = Domain::new();
        let first = domain.resolve("2").unwrap();
        assert_eq!(domain.pack(&first), 1);

        // Vivifying nr 2 coins another variable whose name is also "2"; the
        // name lookup keeps pointing at the older one.
        let second = domain.unpack(2).unwrap();
        assert_ne!(first, second);
        assert_eq!(second.name(), "2");
        assert_eq!(domain.resolve("2").unwrap(), first);
    }

    #[test]
    fn freeze_and_thaw() {
        let domain = Domain::new();
        let known = domain.resolve("known").unwrap();

        domain.freeze();
        assert_eq!(domain.resolve("fresh"), Err(DomainError::Frozen));
        assert_eq!(domain.unpack(2), Err(DomainError::Frozen));
        assert_eq!(domain.resolve("known").unwrap(), known);
        assert_eq!(domain.unpack(1).unwrap(), known);

        domain.thaw();
        assert!(domain.resolve("fresh").is_ok());
    }
}
