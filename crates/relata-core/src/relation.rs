//! Relations: one tuple set plus one field index per position
//!
//! `Relation` keeps the tuple set authoritative and every field index consistent with
//! it. Writes touch the tuple set first and the indices second, in position order, while
//! the tuple's hash bucket stays locked; an add and a removal of the same tuple therefore
//! never interleave their index updates, and once a call returns no index entry refers
//! to a tuple that is gone. Index lookups are not taken under that lock, so a concurrent
//! pattern read can still miss a tuple whose indexing is in flight. Callers needing
//! linearizable reads across writes serialize externally.

use crate::config::RelationConfig;
use crate::error::{FactError, FactResult};
use crate::field_index::FieldIndexStats;
use crate::pattern::{BindingPlan, Probe};
use crate::schema::Schema;
use crate::tuple_set::TupleSet;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, instrument, trace};

/// In-memory fact relation of fixed arity
///
/// # Usage Example
/// ```rust
/// use relata_core::{Field, Relation, bound, unbound};
///
/// let friends = Relation::new((Field::<String>::named("a"), Field::<String>::named("b")));
/// friends.add(("peter".to_string(), "paul".to_string()));
///
/// let found: Vec<_> = friends.read_matching(&(unbound(), bound("paul"))).unwrap().collect();
/// assert_eq!(found, vec![("peter".to_string(), "paul".to_string())]);
/// ```
pub struct Relation<S: Schema> {
    schema: S,
    tuples: TupleSet<S::Row>,
    indices: S::Indices,
}

impl<S: Schema> Relation<S> {
    /// Create an empty relation with the default configuration
    pub fn new(schema: S) -> Self {
        let config = RelationConfig::default();
        let indices = schema.new_indices(&config);
        Self { tuples: TupleSet::with_config(&config), indices, schema }
    }

    /// Create an empty relation sized by `config`
    #[instrument(skip_all, fields(arity = S::ARITY))]
    pub fn with_config(schema: S, config: RelationConfig) -> FactResult<Self> {
        config.validate()?;
        debug!(?config, "Creating relation");
        let indices = schema.new_indices(&config);
        Ok(Self { tuples: TupleSet::with_config(&config), indices, schema })
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub const fn arity(&self) -> usize {
        S::ARITY
    }

    /// Number of live tuples
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Composite hash the relation uses for `row`
    pub fn hash_of(&self, row: &S::Row) -> u64 {
        self.schema.hash_row(row)
    }

    /// Insert a tuple.
    ///
    /// Returns `false`, leaving every index untouched, if an equal tuple is already live.
    pub fn add(&self, row: S::Row) -> bool {
        let hash = self.schema.hash_row(&row);
        let inserted = self.tuples.insert(
            hash,
            row,
            |a, b| self.schema.rows_equal(a, b),
            |new| self.schema.index_row(&self.indices, new, hash),
        );
        if !inserted {
            trace!(hash, "Duplicate tuple ignored");
            return false;
        }
        trace!(hash, "Tuple added");
        true
    }

    /// Whether a tuple equal to `row` is live
    pub fn query(&self, row: &S::Row) -> bool {
        let hash = self.schema.hash_row(row);
        self.tuples.contains(hash, |stored| self.schema.rows_equal(stored, row))
    }

    /// The stored tuple equal to `row`, if any
    pub fn read(&self, row: &S::Row) -> Option<S::Row> {
        let hash = self.schema.hash_row(row);
        self.tuples.find_matching(hash, |stored| self.schema.rows_equal(stored, row))
    }

    /// Remove the tuple equal to `row`, returning it if it was live
    pub fn remove(&self, row: &S::Row) -> Option<S::Row> {
        let hash = self.schema.hash_row(row);
        let removed = self.tuples.remove_matching(
            hash,
            |stored| self.schema.rows_equal(stored, row),
            |gone| self.schema.unindex_row(&self.indices, gone, hash),
        )?;
        trace!(hash, "Tuple removed");
        Some(removed)
    }

    /// Lazily read every tuple consistent with `pattern`.
    ///
    /// Fails with [`FactError::NoBoundField`] when no position is bound. Candidate hashes
    /// are fixed when the call is made; each tuple is fetched when the iterator reaches
    /// it, so writes made while iterating may or may not be observed.
    pub fn read_matching<'a>(&'a self, pattern: &'a S::Pattern) -> FactResult<Matches<'a, S>> {
        let plan = self.plan(pattern, "read_matching")?;
        let hashes = self.candidate_hashes(&plan, pattern);
        trace!(probe = ?plan.probe(), candidates = hashes.len(), "Reading pattern");
        Ok(Matches { relation: self, pattern, plan, hashes: hashes.into_iter(), pending: VecDeque::new() })
    }

    /// Remove every tuple consistent with `pattern`, returning the removed tuples.
    ///
    /// Fails with [`FactError::NoBoundField`] when no position is bound, same as
    /// [`Relation::read_matching`]. Each removed tuple is unindexed under its own values.
    #[instrument(skip_all, fields(arity = S::ARITY))]
    pub fn remove_matching(&self, pattern: &S::Pattern) -> FactResult<Vec<S::Row>> {
        let plan = self.plan(pattern, "remove_matching")?;
        let mut removed = Vec::new();
        for hash in self.candidate_hashes(&plan, pattern) {
            // Unindexed under each tuple's own values, not the pattern's
            let rows = self.tuples.remove_all_matching(
                hash,
                |row| plan.matches(&self.schema, row, pattern),
                |gone| self.schema.unindex_row(&self.indices, gone, hash),
            );
            removed.extend(rows);
        }
        debug!(probe = ?plan.probe(), removed = removed.len(), "Removed tuples matching pattern");
        Ok(removed)
    }

    /// Clone every live tuple.
    ///
    /// This is an explicit full scan; pattern operations never fall back to it.
    pub fn snapshot(&self) -> Vec<S::Row> {
        self.tuples.snapshot()
    }

    /// Drop every tuple and index entry.
    ///
    /// Each tuple is unindexed while its bucket is locked, as in [`Relation::remove`]. A
    /// tuple added concurrently is either dropped or kept fully indexed.
    pub fn clear(&self) {
        let dropped = self.tuples.drain_with(|hash, gone| self.schema.unindex_row(&self.indices, gone, hash));
        debug!(arity = S::ARITY, dropped, "Relation cleared");
    }

    /// Hashes the index at `position` records under `row`'s value at that position
    pub fn indexed_hashes(&self, position: usize, row: &S::Row) -> Vec<u64> {
        self.schema.indexed_hashes(&self.indices, row, position)
    }

    pub fn stats(&self) -> RelationStats {
        RelationStats {
            arity: S::ARITY,
            tuple_count: self.tuples.len(),
            bucket_count: self.tuples.bucket_count(),
            fields: self.schema.index_stats(&self.indices),
        }
    }

    /// Check the index/data invariant in both directions.
    ///
    /// Every live tuple's hash must be recorded in each field index under its value, and
    /// every index entry must name a live tuple holding that value. Meaningful only while
    /// no writer is active.
    #[instrument(skip_all, fields(arity = S::ARITY))]
    pub fn verify_consistency(&self) -> FactResult<()> {
        for (hash, row) in self.tuples.entries() {
            if hash != self.schema.hash_row(&row) {
                return Err(FactError::index_inconsistency(0, hash, "tuple stored under a foreign hash"));
            }
            for position in 0..S::ARITY {
                if !self.schema.indexed_hashes(&self.indices, &row, position).contains(&hash) {
                    return Err(FactError::index_inconsistency(
                        position,
                        hash,
                        format!("live tuple missing from index {}", self.describe_field(position)),
                    ));
                }
            }
        }

        let probe = |hash: u64, check: &dyn Fn(&S::Row) -> bool| self.tuples.contains(hash, check);
        for position in 0..S::ARITY {
            if let Some(hash) = self.schema.find_orphan(&self.indices, position, &probe) {
                return Err(FactError::index_inconsistency(
                    position,
                    hash,
                    format!("index {} names a tuple that is not live", self.describe_field(position)),
                ));
            }
        }

        debug!(tuples = self.tuples.len(), "Relation indices consistent");
        Ok(())
    }

    fn plan(&self, pattern: &S::Pattern, operation: &'static str) -> FactResult<BindingPlan> {
        BindingPlan::for_pattern(&self.schema, pattern).ok_or_else(|| {
            debug!(operation, "Pattern has no bound field");
            FactError::no_bound_field(operation, S::ARITY)
        })
    }

    fn candidate_hashes(&self, plan: &BindingPlan, pattern: &S::Pattern) -> Vec<u64> {
        match plan.probe() {
            Probe::Exact => self.schema.hash_pattern(pattern).into_iter().collect(),
            Probe::Index { driving } => {
                // Colliding tuples sharing the driving value list the same hash twice
                let mut hashes = self.schema.candidates(&self.indices, pattern, driving);
                hashes.sort_unstable();
                hashes.dedup();
                hashes
            }
        }
    }

    fn describe_field(&self, position: usize) -> String {
        match self.schema.field_name(position) {
            Some(name) => format!("{position} ({name})"),
            None => position.to_string(),
        }
    }
}

impl<S: Schema + Default> Default for Relation<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Schema> fmt::Debug for Relation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("arity", &S::ARITY)
            .field("len", &self.tuples.len())
            .finish_non_exhaustive()
    }
}

/// One-shot iterator over the tuples matching a pattern
///
/// Not restartable: call [`Relation::read_matching`] again for a fresh view.
pub struct Matches<'a, S: Schema> {
    relation: &'a Relation<S>,
    pattern: &'a S::Pattern,
    plan: BindingPlan,
    hashes: std::vec::IntoIter<u64>,
    pending: VecDeque<S::Row>,
}

impl<S: Schema> Matches<'_, S> {
    /// The plan chosen for this read
    pub fn plan(&self) -> &BindingPlan {
        &self.plan
    }
}

impl<S: Schema> Iterator for Matches<'_, S> {
    type Item = S::Row;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.pop_front() {
                return Some(row);
            }
            let hash = self.hashes.next()?;
            let relation = self.relation;
            let (plan, pattern) = (&self.plan, self.pattern);
            self.pending = relation
                .tuples
                .find_all_matching(hash, |row| plan.matches(&relation.schema, row, pattern))
                .into();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // A bucket can hold several matches, so only the lower bound is known
        (self.pending.len(), None)
    }
}

impl<S: Schema> std::iter::FusedIterator for Matches<'_, S> {}

/// Relation-wide statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationStats {
    pub arity: usize,
    pub tuple_count: usize,
    pub bucket_count: usize,
    pub fields: Vec<FieldIndexStats>,
}

impl RelationStats {
    /// Hash references across all indices; equals `arity * tuple_count` when consistent
    pub fn total_hash_refs(&self) -> usize {
        self.fields.iter().map(|field| field.total_hash_refs).sum()
    }
}
