//! Per-field secondary indices
//!
//! A `FieldIndex` maps one field's values to the composite hashes of the tuples that
//! currently hold that value at that position. Values are bucketed by the field
//! comparer's hash and told apart with the comparer's equality, so custom comparers
//! (case-insensitive strings, tolerant floats, ...) index the way they compare.
//!
//! Values the comparer classifies as absent share one dedicated slot that can never
//! collide with a real value.

use crate::config::RelationConfig;
use dashmap::DashMap;
use relata_types::Field;
use serde::Serialize;

/// Bucket key inside the index map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Absent,
    Value(u64),
}

#[derive(Debug)]
struct IndexEntry<T> {
    key: T,
    hashes: Vec<u64>,
}

/// Secondary index for one field position
pub struct FieldIndex<T> {
    field: Field<T>,
    entries: DashMap<Slot, Vec<IndexEntry<T>>, ahash::RandomState>,
}

impl<T: Clone> FieldIndex<T> {
    /// Build an empty index for `field`; the config must already be validated
    pub(crate) fn new(field: Field<T>, config: &RelationConfig) -> Self {
        let hasher = ahash::RandomState::new();
        let entries = match config.shard_amount {
            Some(shards) => DashMap::with_capacity_and_hasher_and_shard_amount(
                config.index_capacity,
                hasher,
                shards,
            ),
            None => DashMap::with_capacity_and_hasher(config.index_capacity, hasher),
        };
        Self { field, entries }
    }

    /// The field this index serves
    pub fn field(&self) -> &Field<T> {
        &self.field
    }

    /// Record that the tuple with composite hash `hash` holds `value`
    pub fn add(&self, value: &T, hash: u64) {
        let slot = self.slot_of(value);
        let mut bucket = self.entries.entry(slot).or_default();
        match bucket.iter_mut().find(|entry| self.key_matches(slot, &entry.key, value)) {
            Some(entry) => entry.hashes.push(hash),
            None => bucket.push(IndexEntry { key: value.clone(), hashes: vec![hash] }),
        }
    }

    /// Drop one occurrence of `hash` under `value`.
    ///
    /// Missing values and hashes are ignored, so removal is idempotent.
    pub fn remove(&self, value: &T, hash: u64) {
        let slot = self.slot_of(value);
        let now_empty = {
            let Some(mut bucket) = self.entries.get_mut(&slot) else {
                return;
            };
            if let Some(pos) = bucket.iter().position(|entry| self.key_matches(slot, &entry.key, value)) {
                let entry = &mut bucket[pos];
                if let Some(i) = entry.hashes.iter().position(|&h| h == hash) {
                    entry.hashes.swap_remove(i);
                }
                if entry.hashes.is_empty() {
                    bucket.swap_remove(pos);
                }
            }
            bucket.is_empty()
        };
        if now_empty {
            self.entries.remove_if(&slot, |_, bucket| bucket.is_empty());
        }
    }

    /// Whether any live tuple holds `value`
    pub fn contains_key(&self, value: &T) -> bool {
        let slot = self.slot_of(value);
        self.entries
            .get(&slot)
            .is_some_and(|bucket| bucket.iter().any(|entry| self.key_matches(slot, &entry.key, value)))
    }

    /// Composite hashes recorded under `value`; empty when the value is unknown
    pub fn get(&self, value: &T) -> Vec<u64> {
        let slot = self.slot_of(value);
        self.entries
            .get(&slot)
            .and_then(|bucket| {
                bucket
                    .iter()
                    .find(|entry| self.key_matches(slot, &entry.key, value))
                    .map(|entry| entry.hashes.clone())
            })
            .unwrap_or_default()
    }

    /// Clone every (value, hashes) entry
    pub fn entries(&self) -> Vec<(T, Vec<u64>)> {
        self.entries
            .iter()
            .flat_map(|bucket| {
                bucket
                    .value()
                    .iter()
                    .map(|entry| (entry.key.clone(), entry.hashes.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Number of distinct values currently indexed
    pub fn len(&self) -> usize {
        self.entries.iter().map(|bucket| bucket.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> FieldIndexStats {
        let mut stats = FieldIndexStats {
            field_name: self.field.name().map(str::to_owned),
            ..FieldIndexStats::default()
        };
        for bucket in self.entries.iter() {
            let refs: usize = bucket.value().iter().map(|entry| entry.hashes.len()).sum();
            stats.distinct_values += bucket.value().len();
            stats.total_hash_refs += refs;
            if *bucket.key() == Slot::Absent {
                stats.absent_refs += refs;
            }
        }
        stats
    }

    fn slot_of(&self, value: &T) -> Slot {
        if self.field.is_absent(value) { Slot::Absent } else { Slot::Value(self.field.hash(value)) }
    }

    fn key_matches(&self, slot: Slot, stored: &T, probe: &T) -> bool {
        match slot {
            Slot::Absent => true,
            Slot::Value(_) => self.field.equals(stored, probe),
        }
    }
}

impl<T> std::fmt::Debug for FieldIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldIndex")
            .field("field", &self.field)
            .field("slots", &self.entries.len())
            .finish()
    }
}

/// Statistics about one field index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldIndexStats {
    pub field_name: Option<String>,
    pub distinct_values: usize,
    pub total_hash_refs: usize,
    pub absent_refs: usize,
}

impl FieldIndexStats {
    /// Average number of tuples sharing a value (lower means better selectivity)
    pub fn avg_hashes_per_value(&self) -> f64 {
        if self.distinct_values == 0 {
            0.0
        } else {
            self.total_hash_refs as f64 / self.distinct_values as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relata_types::{DefaultComparer, FnComparer, OptionComparer};

    fn index<T: Clone + Eq + std::hash::Hash + 'static>() -> FieldIndex<T> {
        FieldIndex::new(Field::new(), &RelationConfig::default())
    }

    #[test]
    fn test_add_get_remove() {
        let idx = index::<String>();
        idx.add(&"active".to_string(), 1);
        idx.add(&"active".to_string(), 3);
        idx.add(&"inactive".to_string(), 2);

        let mut active = idx.get(&"active".to_string());
        active.sort_unstable();
        assert_eq!(active, vec![1, 3]);
        assert_eq!(idx.len(), 2);
        assert!(idx.contains_key(&"inactive".to_string()));

        idx.remove(&"inactive".to_string(), 2);
        assert!(!idx.contains_key(&"inactive".to_string()));
        assert!(idx.get(&"inactive".to_string()).is_empty());
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let idx = index::<u32>();
        idx.add(&10, 99);
        idx.remove(&10, 99);
        idx.remove(&10, 99);
        idx.remove(&11, 1);
        assert!(idx.is_empty());
    }

    #[test]
    fn test_remove_drops_a_single_occurrence() {
        // Two colliding tuples sharing a value record the same hash twice
        let idx = index::<u32>();
        idx.add(&4, 7);
        idx.add(&4, 7);
        idx.remove(&4, 7);
        assert_eq!(idx.get(&4), vec![7]);
    }

    #[test]
    fn test_absent_slot_is_distinct() {
        let field = Field::with_comparer(OptionComparer::new(DefaultComparer::new()));
        let idx: FieldIndex<Option<String>> = FieldIndex::new(field, &RelationConfig::default());
        idx.add(&None, 1);
        idx.add(&Some(String::new()), 2);

        assert_eq!(idx.get(&None), vec![1]);
        assert_eq!(idx.get(&Some(String::new())), vec![2]);

        let stats = idx.stats();
        assert_eq!(stats.distinct_values, 2);
        assert_eq!(stats.absent_refs, 1);
    }

    #[test]
    fn test_custom_comparer_lookup() {
        let field = Field::with_comparer(FnComparer::new(
            |a: &String, b: &String| a.eq_ignore_ascii_case(b),
            |v: &String| v.len() as u64,
        ))
        .with_name("name");
        let idx = FieldIndex::new(field, &RelationConfig::default());
        idx.add(&"Peter".to_string(), 5);

        assert_eq!(idx.get(&"PETER".to_string()), vec![5]);
        assert!(!idx.contains_key(&"Petra".to_string()));
        assert_eq!(idx.stats().field_name.as_deref(), Some("name"));
    }

    #[test]
    fn test_stats() {
        let idx = index::<u64>();
        for i in 1..=10 {
            idx.add(&(i % 3), i);
        }
        let stats = idx.stats();
        assert_eq!(stats.distinct_values, 3);
        assert_eq!(stats.total_hash_refs, 10);
        assert!(stats.avg_hashes_per_value() > 3.0);
    }
}
