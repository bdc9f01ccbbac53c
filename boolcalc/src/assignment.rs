//! Assignments of truth values to variables.

use std::fmt;
use std::iter::FromIterator;

use crate::var::VarRef;
use crate::varmap::{OutOfRange, VarMap};

/// A (partial) assignment of truth values to an ordered list of variables.
///
/// Besides the mapping itself, an assignment carries an `overflow` flag that
/// turns the ordered keys into a little-endian binary counter: the first key
/// is the least significant bit, [`increment`](Assignment::increment) adds
/// one, and `overflow` reports that the counter wrapped around to all-false.
/// Iterating a formula's truth table is exactly counting this way from the
/// all-false assignment until overflow.
#[derive(Clone, PartialEq, Eq)]
pub struct Assignment {
    map: VarMap,
    overflow: bool,
}

impl Assignment {
    /// Creates the overflown dummy assignment on no variables.
    ///
    /// This is the sentinel an exhausted counter ends on; use
    /// [`from_vars`](Assignment::from_vars) for a usable starting point.
    pub fn new() -> Assignment {
        Assignment {
            map: VarMap::new(),
            overflow: true,
        }
    }

    /// Creates the all-false assignment on the given variables.
    pub fn from_vars(vars: impl IntoIterator<Item = VarRef>) -> Assignment {
        Assignment {
            map: VarMap::from_vars(vars),
            overflow: false,
        }
    }

    /// Whether the counter has wrapped around to all-false.
    pub fn overflown(&self) -> bool {
        self.overflow
    }

    /// Adds one to the counter.
    ///
    /// Bits are toggled starting at the first key until one of them carries
    /// no further; `overflow` becomes true exactly when every bit wrapped
    /// back to false.
    pub fn increment(&mut self) {
        let mut carries = 0;
        for index in 0..self.map.len() {
            if self.map.toggle_nth(index) {
                break;
            }
            carries += 1;
        }
        self.overflow = carries >= self.map.len();
    }

    /// The assignment with every bit flipped.
    ///
    /// Keeps the variable order and the overflow flag.
    pub fn negate(&self) -> Assignment {
        Assignment {
            map: self
                .map
                .iter()
                .map(|(var, value)| (var.clone(), !value))
                .collect(),
            overflow: self.overflow,
        }
    }

    /// Whether the variable is assigned at all.
    pub fn exists(&self, var: &VarRef) -> bool {
        self.map.exists(var)
    }

    /// The assigned variables in counter order (first is the LSB).
    pub fn vars(&self) -> &[VarRef] {
        self.map.vars()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The value assigned to `var`, if any.
    pub fn get(&self, var: &VarRef) -> Option<bool> {
        self.map.get(var)
    }

    /// The value assigned to `var`, failing with [`OutOfRange`] if there is
    /// none.
    pub fn value(&self, var: &VarRef) -> Result<bool, OutOfRange> {
        self.map.value(var)
    }

    /// Assigns `value` to `var`, appending it to the order if it was not
    /// assigned before.
    pub fn set(&mut self, var: VarRef, value: bool) {
        self.map.set(var, value);
    }

    /// Iterates over `(variable, value)` pairs in counter order.
    pub fn iter(&self) -> impl Iterator<Item = (&VarRef, bool)> {
        self.map.iter()
    }
}

impl Default for Assignment {
    fn default() -> Assignment {
        Assignment::new()
    }
}

/// Collects pairs into a non-overflown assignment in pair order.
impl FromIterator<(VarRef, bool)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (VarRef, bool)>>(pairs: I) -> Assignment {
        Assignment {
            map: pairs.into_iter().collect(),
            overflow: false,
        }
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.map, f)
    }
}
