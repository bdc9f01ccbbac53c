//! Truth table streams.

use crate::assignment::Assignment;
use crate::formula::Formula;

/// Lazily runs through all assignments over a formula's variables in
/// counter order, yielding each assignment together with the formula's
/// value under it.
///
/// The first assignment is all-false and the stream ends when the counter
/// overflows, so the length is `2^n` for `n` variables; a constant formula
/// has exactly one row, the empty assignment.
pub struct Truthtable {
    formula: Formula,
    current: Assignment,
}

impl Truthtable {
    pub(crate) fn new(formula: &Formula) -> Truthtable {
        Truthtable {
            current: Assignment::from_vars(formula.vars()),
            formula: formula.clone(),
        }
    }

    /// The formula being tabulated.
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// The assignment the next call to `next` will yield.
    pub fn assignment(&self) -> &Assignment {
        &self.current
    }
}

impl Iterator for Truthtable {
    type Item = (Assignment, bool);

    fn next(&mut self) -> Option<(Assignment, bool)> {
        if self.current.overflown() {
            return None;
        }
        let assign = self.current.clone();
        let value = self
            .formula
            .eval(&assign)
            .expect("truth table assignments are total");
        self.current.increment();
        Some((assign, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    use std::sync::Arc;

    use proptest::prelude::*;

    use crate::test::formula;

    fn table_of(input: &str) -> Vec<bool> {
        let domain = Arc::new(Domain::new());
        let fm = Formula::parse(input, &domain).unwrap();
        fm.truthtable().map(|(_, value)| value).collect()
    }

    #[test]
    fn constants_have_one_row() {
        assert_eq!(table_of("\\T"), [true]);
        assert_eq!(table_of("\\F"), [false]);

        let domain = Arc::new(Domain::new());
        let fm = Formula::parse("\\T", &domain).unwrap();
        let tt = fm.truthtable();
        assert!(tt.assignment().is_empty());
        assert_eq!(tt.formula().to_postfix(), "\\T");
    }

    #[test]
    fn rows_follow_counter_order() {
        // Row order: [~a ~b], [a ~b], [~a b], [a b].
        assert_eq!(table_of("a & b"), [false, false, false, true]);
        assert_eq!(table_of("a | b"), [false, true, true, true]);
        assert_eq!(table_of("a > b"), [true, false, true, true]);
        assert_eq!(table_of("a = b"), [true, false, false, true]);
        assert_eq!(table_of("a ^ b"), [false, true, true, false]);
        assert_eq!(table_of("~a"), [true, false]);
    }

    #[test]
    fn conjunction_of_three_has_one_satisfying_row() {
        let domain = Arc::new(Domain::new());
        let fm = Formula::parse("a & b & c", &domain).unwrap();

        let rows: Vec<_> = fm.truthtable().collect();
        assert_eq!(rows.len(), 8);

        let satisfying: Vec<_> = rows.iter().filter(|(_, value)| *value).collect();
        assert_eq!(satisfying.len(), 1);
        let (assign, _) = satisfying[0];
        assert!(assign.iter().all(|(_, value)| value));
    }

    proptest! {
        #[test]
        fn eval_agrees_with_every_row(fm in formula(4, 3)) {
            let mut rows = 0;
            for (assign, value) in fm.truthtable() {
                prop_assert_eq!(fm.eval(&assign).unwrap(), value);
                rows += 1;
            }
            prop_assert_eq!(rows, 1usize << fm.vars().len());
        }
    }
}
