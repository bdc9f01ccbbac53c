//! Ordered mappings from variables to truth values.

use std::fmt;
use std::iter::FromIterator;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::var::VarRef;

/// A strict read found no entry for the requested variable.
///
/// Raised by [`VarMap::value`] and by strict formula evaluation when it hits
/// a variable the assignment does not cover.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("variable [{0}] is not mapped")]
pub struct OutOfRange(pub String);

/// A partial mapping from variables to truth values with a total order on
/// its keys.
///
/// Every mapped variable appears exactly once in the key list and iteration
/// follows that list. The order is whatever the constructor or the first
/// [`set`](VarMap::set) of each key established; it is what gives
/// [`Assignment`](crate::assignment::Assignment) its counter semantics and
/// clause enumeration its determinism.
#[derive(Clone, Default)]
pub struct VarMap {
    order: Vec<VarRef>,
    map: FxHashMap<VarRef, bool>,
}

impl VarMap {
    /// Creates an empty mapping.
    pub fn new() -> VarMap {
        VarMap::default()
    }

    /// Creates the all-false mapping on the given variables, in the given
    /// order.
    pub fn from_vars(vars: impl IntoIterator<Item = VarRef>) -> VarMap {
        vars.into_iter().map(|var| (var, false)).collect()
    }

    /// Whether the variable is mapped at all.
    pub fn exists(&self, var: &VarRef) -> bool {
        self.map.contains_key(var)
    }

    /// The keys in their fixed order.
    pub fn vars(&self) -> &[VarRef] {
        &self.order
    }

    /// Number of mapped variables.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The value mapped to `var`, if any.
    pub fn get(&self, var: &VarRef) -> Option<bool> {
        self.map.get(var).copied()
    }

    /// The value mapped to `var`, failing with [`OutOfRange`] if there is
    /// none.
    pub fn value(&self, var: &VarRef) -> Result<bool, OutOfRange> {
        self.get(var)
            .ok_or_else(|| OutOfRange(var.name().to_string()))
    }

    /// Maps `var` to `value`, appending it to the key order if it was not
    /// mapped before.
    pub fn set(&mut self, var: VarRef, value: bool) {
        if self.map.insert(var.clone(), value).is_none() {
            self.order.push(var);
        }
    }

    /// The key and value at the given position of the key order.
    pub fn nth(&self, index: usize) -> Option<(&VarRef, bool)> {
        let var = self.order.get(index)?;
        Some((var, self.map[var]))
    }

    /// Flips the value at the given position of the key order and returns
    /// the new value.
    pub(crate) fn toggle_nth(&mut self, index: usize) -> bool {
        let var = self.order[index].clone();
        let bit = self.map.entry(var).or_insert(false);
        *bit = !*bit;
        *bit
    }

    /// Iterates over `(variable, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&VarRef, bool)> {
        self.order.iter().map(move |var| (var, self.map[var]))
    }
}

impl FromIterator<(VarRef, bool)> for VarMap {
    fn from_iter<I: IntoIterator<Item = (VarRef, bool)>>(pairs: I) -> VarMap {
        let mut varmap = VarMap::new();
        for (var, value) in pairs {
            varmap.set(var, value);
        }
        varmap
    }
}

/// Equal iff the key orders and the mapped values agree.
impl PartialEq for VarMap {
    fn eq(&self, other: &VarMap) -> bool {
        self.order == other.order && self.map == other.map
    }
}

impl Eq for VarMap {}

impl fmt::Debug for VarMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(var, value)| (var.name(), value)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(names: &[&str]) -> Vec<VarRef> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| VarRef::new(name.to_string(), index as u32 + 1))
            .collect()
    }

    #[test]
    fn set_appends_missing_keys_in_order() {
        let v = vars(&["a", "b", "c"]);
        let mut map = VarMap::new();
        map.set(v[2].clone(), true);
        map.set(v[0].clone(), false);
        map.set(v[2].clone(), false);

        assert_eq!(map.vars(), &[v[2].clone(), v[0].clone()][..]);
        assert_eq!(map.get(&v[2]), Some(false));
        assert_eq!(map.get(&v[1]), None);
        assert_eq!(map.nth(1), Some((&v[0], false)));
        assert_eq!(map.nth(2), None);
    }

    #[test]
    fn strict_read_of_missing_key_fails() {
        let v = vars(&["a", "b"]);
        let map = VarMap::from_vars(vec![v[0].clone()]);

        assert_eq!(map.value(&v[0]), Ok(false));
        assert_eq!(map.value(&v[1]), Err(OutOfRange("b".to_string())));
    }

    #[test]
    fn equality_requires_same_order() {
        let v = vars(&["a", "b"]);
        let ab: VarMap = vec![(v[0].clone(), true), (v[1].clone(), false)]
            .into_iter()
            .collect();
        let ba: VarMap = vec![(v[1].clone(), false), (v[0].clone(), true)]
            .into_iter()
            .collect();

        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }
}
