//! Binding-pattern planning
//!
//! A plan decides where candidate tuples come from and how each candidate is filtered:
//!
//! * every position bound: probe the tuple set directly with the composite hash;
//! * otherwise the first bound position `d` drives. Its field index supplies candidate
//!   hashes. Position `d` and the run of bound positions right after it are checked
//!   strictly. From the first unbound position onwards every position is checked
//!   tolerantly: unbound passes, bound must match. Positions before `d` are unbound and
//!   unconstrained.
//!
//! A pattern with no bound position has no plan; there is no full-scan fallback.

use crate::schema::Schema;
use std::ops::Range;

/// Where a plan's candidate hashes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Composite hash of the fully bound pattern
    Exact,
    /// Field index at the driving position
    Index { driving: usize },
}

/// Driving-index choice plus the residual predicate for one pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPlan {
    probe: Probe,
    strict: Range<usize>,
    tolerant: Range<usize>,
}

impl BindingPlan {
    /// Plan `pattern`, or `None` when no position is bound
    pub fn for_pattern<S: Schema>(schema: &S, pattern: &S::Pattern) -> Option<Self> {
        let arity = S::ARITY;
        let driving = (0..arity).find(|&position| schema.is_bound(pattern, position))?;

        let mut strict_end = driving + 1;
        while strict_end < arity && schema.is_bound(pattern, strict_end) {
            strict_end += 1;
        }

        let probe =
            if driving == 0 && strict_end == arity { Probe::Exact } else { Probe::Index { driving } };

        Some(Self { probe, strict: driving..strict_end, tolerant: strict_end..arity })
    }

    pub const fn probe(&self) -> Probe {
        self.probe
    }

    /// First bound position
    pub const fn driving(&self) -> usize {
        self.strict.start
    }

    /// Positions that must be bound and equal
    pub fn strict_positions(&self) -> Range<usize> {
        self.strict.clone()
    }

    /// Positions that match when unbound or equal
    pub fn tolerant_positions(&self) -> Range<usize> {
        self.tolerant.clone()
    }

    /// Residual predicate: does `row` satisfy `pattern` under this plan
    pub fn matches<S: Schema>(&self, schema: &S, row: &S::Row, pattern: &S::Pattern) -> bool {
        self.strict_positions().all(|p| schema.field_matches(row, pattern, p) == Some(true))
            && self.tolerant_positions().all(|p| schema.field_matches(row, pattern, p) != Some(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relata_types::{Binding, Field, bound, unbound};

    type Triple = (Field<u32>, Field<u32>, Field<u32>);

    fn triple() -> Triple {
        (Field::new(), Field::new(), Field::new())
    }

    fn plan(pattern: (Binding<u32>, Binding<u32>, Binding<u32>)) -> Option<BindingPlan> {
        BindingPlan::for_pattern(&triple(), &pattern)
    }

    #[test]
    fn test_no_bound_field_has_no_plan() {
        assert_eq!(plan((unbound(), unbound(), unbound())), None);
    }

    #[test]
    fn test_fully_bound_pattern_is_exact() {
        let p = plan((bound(1u32), bound(2u32), bound(3u32))).unwrap();
        assert_eq!(p.probe(), Probe::Exact);
        assert_eq!(p.strict_positions(), 0..3);
        assert!(p.tolerant_positions().is_empty());
    }

    #[test]
    fn test_first_bound_position_drives() {
        let p = plan((unbound(), bound(2u32), unbound())).unwrap();
        assert_eq!(p.probe(), Probe::Index { driving: 1 });
        assert_eq!(p.strict_positions(), 1..2);
        assert_eq!(p.tolerant_positions(), 2..3);
    }

    #[test]
    fn test_trailing_bound_run_is_strict_without_exact_probe() {
        let p = plan((unbound(), bound(2u32), bound(3u32))).unwrap();
        assert_eq!(p.probe(), Probe::Index { driving: 1 });
        assert_eq!(p.strict_positions(), 1..3);
        assert!(p.tolerant_positions().is_empty());
    }

    #[test]
    fn test_gap_switches_to_tolerant() {
        let p = plan((bound(1u32), unbound(), bound(3u32))).unwrap();
        assert_eq!(p.probe(), Probe::Index { driving: 0 });
        assert_eq!(p.strict_positions(), 0..1);
        assert_eq!(p.tolerant_positions(), 1..3);

        let schema = triple();
        let pattern = (bound(1u32), unbound(), bound(3u32));
        assert!(p.matches(&schema, &(1, 9, 3), &pattern));
        assert!(!p.matches(&schema, &(1, 9, 4), &pattern));
        assert!(!p.matches(&schema, &(2, 9, 3), &pattern));
    }
}
