//! Relation schemas: per-position access to tuples, patterns and indices
//!
//! A schema is a tuple of [`Field`] descriptors, one per position. It fixes the row type
//! (`(A, B, ...)`), the binding pattern type (`(Binding<A>, Binding<B>, ...)`) and the
//! matching tuple of field indices. The relation algorithm walks positions at runtime and
//! reaches the typed data only through the accessors below, so one generic `Relation`
//! serves every arity.
//!
//! Implementations are provided for field tuples of arity 1 through
//! [`MAX_ARITY`](crate::constants::arity::MAX_ARITY).

use crate::composite_key::CompositeHasher;
use crate::config::RelationConfig;
use crate::field_index::{FieldIndex, FieldIndexStats};
use relata_types::{Binding, Field};

/// Per-position view of a fixed-arity relation
///
/// Positions are zero-based and always below [`Schema::ARITY`]; out-of-range positions
/// read as unbound / empty.
pub trait Schema {
    /// Stored tuple type
    type Row: Clone;
    /// One binding per position
    type Pattern;
    /// One field index per position
    type Indices;

    const ARITY: usize;

    /// Display name of the field at `position`
    fn field_name(&self, position: usize) -> Option<&str>;

    /// Composite hash of a tuple
    fn hash_row(&self, row: &Self::Row) -> u64;

    /// Composite hash of a fully bound pattern; `None` if any position is unbound
    fn hash_pattern(&self, pattern: &Self::Pattern) -> Option<u64>;

    /// Field-wise equality of two tuples
    fn rows_equal(&self, left: &Self::Row, right: &Self::Row) -> bool;

    fn is_bound(&self, pattern: &Self::Pattern, position: usize) -> bool;

    /// Compare the tuple's value at `position` with the pattern's bound value there.
    ///
    /// `None` when the pattern leaves the position unbound.
    fn field_matches(&self, row: &Self::Row, pattern: &Self::Pattern, position: usize) -> Option<bool>;

    /// Build empty indices, one per field; `config` must have passed
    /// [`RelationConfig::validate`]
    fn new_indices(&self, config: &RelationConfig) -> Self::Indices;

    /// Record `hash` in every index under the tuple's values, first position first
    fn index_row(&self, indices: &Self::Indices, row: &Self::Row, hash: u64);

    /// Drop `hash` from every index under the tuple's values, first position first
    fn unindex_row(&self, indices: &Self::Indices, row: &Self::Row, hash: u64);

    /// Hashes the index at `position` holds for the pattern's bound value there
    fn candidates(&self, indices: &Self::Indices, pattern: &Self::Pattern, position: usize) -> Vec<u64>;

    /// Hashes the index at `position` holds for the tuple's value there
    fn indexed_hashes(&self, indices: &Self::Indices, row: &Self::Row, position: usize) -> Vec<u64>;

    /// First index entry at `position` whose hash has no live tuple with that value.
    ///
    /// `probe(hash, check)` must report whether the tuple set bucket `hash` holds a tuple
    /// satisfying `check`.
    fn find_orphan(
        &self,
        indices: &Self::Indices,
        position: usize,
        probe: &dyn Fn(u64, &dyn Fn(&Self::Row) -> bool) -> bool,
    ) -> Option<u64>;

    fn index_stats(&self, indices: &Self::Indices) -> Vec<FieldIndexStats>;
}

macro_rules! impl_schema {
    ($arity:literal => $($idx:tt : $T:ident),+) => {
        impl<$($T: Clone),+> Schema for ($(Field<$T>,)+) {
            type Row = ($($T,)+);
            type Pattern = ($(Binding<$T>,)+);
            type Indices = ($(FieldIndex<$T>,)+);

            const ARITY: usize = $arity;

            fn field_name(&self, position: usize) -> Option<&str> {
                match position {
                    $($idx => self.$idx.name(),)+
                    _ => None,
                }
            }

            fn hash_row(&self, row: &Self::Row) -> u64 {
                let mut hasher = CompositeHasher::new();
                $(hasher.write_field(self.$idx.hash(&row.$idx));)+
                hasher.finish()
            }

            fn hash_pattern(&self, pattern: &Self::Pattern) -> Option<u64> {
                let mut hasher = CompositeHasher::new();
                $(hasher.write_field(self.$idx.hash(pattern.$idx.as_bound()?));)+
                Some(hasher.finish())
            }

            fn rows_equal(&self, left: &Self::Row, right: &Self::Row) -> bool {
                $(self.$idx.equals(&left.$idx, &right.$idx))&&+
            }

            fn is_bound(&self, pattern: &Self::Pattern, position: usize) -> bool {
                match position {
                    $($idx => pattern.$idx.is_bound(),)+
                    _ => false,
                }
            }

            fn field_matches(&self, row: &Self::Row, pattern: &Self::Pattern, position: usize) -> Option<bool> {
                match position {
                    $($idx => pattern.$idx.as_bound().map(|value| self.$idx.equals(&row.$idx, value)),)+
                    _ => None,
                }
            }

            fn new_indices(&self, config: &RelationConfig) -> Self::Indices {
                ($(FieldIndex::new(self.$idx.clone(), config),)+)
            }

            fn index_row(&self, indices: &Self::Indices, row: &Self::Row, hash: u64) {
                $(indices.$idx.add(&row.$idx, hash);)+
            }

            fn unindex_row(&self, indices: &Self::Indices, row: &Self::Row, hash: u64) {
                $(indices.$idx.remove(&row.$idx, hash);)+
            }

            fn candidates(&self, indices: &Self::Indices, pattern: &Self::Pattern, position: usize) -> Vec<u64> {
                match position {
                    $($idx => pattern.$idx.as_bound().map(|value| indices.$idx.get(value)).unwrap_or_default(),)+
                    _ => Vec::new(),
                }
            }

            fn indexed_hashes(&self, indices: &Self::Indices, row: &Self::Row, position: usize) -> Vec<u64> {
                match position {
                    $($idx => indices.$idx.get(&row.$idx),)+
                    _ => Vec::new(),
                }
            }

            fn find_orphan(
                &self,
                indices: &Self::Indices,
                position: usize,
                probe: &dyn Fn(u64, &dyn Fn(&Self::Row) -> bool) -> bool,
            ) -> Option<u64> {
                match position {
                    $($idx => indices.$idx.entries().into_iter().find_map(|(value, hashes)| {
                        let holds_value = |row: &Self::Row| self.$idx.equals(&row.$idx, &value);
                        hashes.into_iter().find(|&hash| !probe(hash, &holds_value))
                    }),)+
                    _ => None,
                }
            }

            fn index_stats(&self, indices: &Self::Indices) -> Vec<FieldIndexStats> {
                vec![$(indices.$idx.stats(),)+]
            }
        }
    };
}

impl_schema!(1 => 0: A);
impl_schema!(2 => 0: A, 1: B);
impl_schema!(3 => 0: A, 1: B, 2: C);
impl_schema!(4 => 0: A, 1: B, 2: C, 3: D);
impl_schema!(5 => 0: A, 1: B, 2: C, 3: D, 4: E);
impl_schema!(6 => 0: A, 1: B, 2: C, 3: D, 4: E, 5: F);
impl_schema!(7 => 0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G);
impl_schema!(8 => 0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G, 7: H);
