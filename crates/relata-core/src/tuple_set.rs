//! Authoritative tuple storage keyed by composite hash
//!
//! Each bucket holds every live tuple whose composite hash is the bucket key. Buckets
//! usually hold one tuple; collisions are resolved by the predicate the caller supplies.
//! The map is sharded, so each bucket operation is atomic on its own while operations on
//! different buckets proceed in parallel.
//!
//! Mutating operations accept a hook that runs while the bucket is still locked. The
//! relation uses it to update field indices, so an add and a removal of the same tuple
//! cannot interleave their index updates. Hooks must not call back into the same set.

use crate::config::RelationConfig;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

type Buckets<R> = DashMap<u64, Vec<R>, ahash::RandomState>;

/// Concurrent multiset of tuples bucketed by composite hash
#[derive(Debug)]
pub struct TupleSet<R> {
    buckets: Buckets<R>,
    len: AtomicUsize,
}

impl<R: Clone> TupleSet<R> {
    /// Build an empty set sized from `config`; the config must already be validated
    pub(crate) fn with_config(config: &RelationConfig) -> Self {
        let hasher = ahash::RandomState::new();
        let buckets = match config.shard_amount {
            Some(shards) => DashMap::with_capacity_and_hasher_and_shard_amount(
                config.initial_capacity,
                hasher,
                shards,
            ),
            None => DashMap::with_capacity_and_hasher(config.initial_capacity, hasher),
        };
        Self { buckets, len: AtomicUsize::new(0) }
    }

    /// Store `row` unless the bucket already holds a tuple `eq` considers the same.
    ///
    /// `on_insert` sees the row just before it becomes visible. Returns `true` when the
    /// row was stored.
    pub fn insert<F, H>(&self, hash: u64, row: R, eq: F, on_insert: H) -> bool
    where
        F: Fn(&R, &R) -> bool,
        H: FnOnce(&R),
    {
        let mut bucket = self.buckets.entry(hash).or_default();
        if bucket.iter().any(|existing| eq(existing, &row)) {
            return false;
        }
        on_insert(&row);
        bucket.push(row);
        self.len.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Whether any tuple in the bucket satisfies `predicate`
    pub fn contains<P>(&self, hash: u64, predicate: P) -> bool
    where
        P: Fn(&R) -> bool,
    {
        self.buckets.get(&hash).is_some_and(|bucket| bucket.iter().any(|row| predicate(row)))
    }

    /// First tuple in the bucket satisfying `predicate`
    pub fn find_matching<P>(&self, hash: u64, predicate: P) -> Option<R>
    where
        P: Fn(&R) -> bool,
    {
        let bucket = self.buckets.get(&hash)?;
        bucket.iter().find(|row| predicate(row)).cloned()
    }

    /// Every tuple in the bucket satisfying `predicate`
    pub fn find_all_matching<P>(&self, hash: u64, predicate: P) -> Vec<R>
    where
        P: Fn(&R) -> bool,
    {
        self.buckets
            .get(&hash)
            .map(|bucket| bucket.iter().filter(|row| predicate(row)).cloned().collect())
            .unwrap_or_default()
    }

    /// Remove and return the first tuple in the bucket satisfying `predicate`.
    ///
    /// `on_remove` sees the tuple before the bucket is unlocked.
    pub fn remove_matching<P, H>(&self, hash: u64, predicate: P, on_remove: H) -> Option<R>
    where
        P: Fn(&R) -> bool,
        H: FnOnce(&R),
    {
        let removed = {
            let mut bucket = self.buckets.get_mut(&hash)?;
            let position = bucket.iter().position(|row| predicate(row))?;
            let row = bucket.swap_remove(position);
            on_remove(&row);
            row
        };
        self.len.fetch_sub(1, Ordering::Relaxed);
        self.prune(hash);
        Some(removed)
    }

    /// Remove and return every tuple in the bucket satisfying `predicate`.
    ///
    /// `on_remove` sees each tuple before the bucket is unlocked.
    pub fn remove_all_matching<P, H>(&self, hash: u64, predicate: P, mut on_remove: H) -> Vec<R>
    where
        P: Fn(&R) -> bool,
        H: FnMut(&R),
    {
        let mut removed = Vec::new();
        if let Some(mut bucket) = self.buckets.get_mut(&hash) {
            let mut i = 0;
            while i < bucket.len() {
                if predicate(&bucket[i]) {
                    let row = bucket.swap_remove(i);
                    on_remove(&row);
                    removed.push(row);
                } else {
                    i += 1;
                }
            }
        }
        if !removed.is_empty() {
            self.len.fetch_sub(removed.len(), Ordering::Relaxed);
            self.prune(hash);
        }
        removed
    }

    /// Number of live tuples
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of non-empty hash buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Clone every live tuple together with its bucket hash
    pub fn entries(&self) -> Vec<(u64, R)> {
        self.buckets
            .iter()
            .flat_map(|bucket| {
                let hash = *bucket.key();
                bucket.value().iter().map(move |row| (hash, row.clone())).collect::<Vec<_>>()
            })
            .collect()
    }

    /// Clone every live tuple
    pub fn snapshot(&self) -> Vec<R> {
        self.buckets.iter().flat_map(|bucket| bucket.value().clone()).collect()
    }

    /// Remove every tuple, bucket by bucket, returning how many were dropped.
    ///
    /// `on_remove` sees each tuple and its hash while that tuple's bucket is locked. A
    /// concurrent insert either lands before its bucket is drained, and is drained with
    /// it, or after, and stays.
    pub fn drain_with<H>(&self, mut on_remove: H) -> usize
    where
        H: FnMut(u64, &R),
    {
        let mut drained = 0;
        self.buckets.retain(|&hash, bucket| {
            for row in bucket.drain(..) {
                on_remove(hash, &row);
                drained += 1;
            }
            false
        });
        self.len.fetch_sub(drained, Ordering::Relaxed);
        drained
    }

    fn prune(&self, hash: u64) {
        self.buckets.remove_if(&hash, |_, bucket| bucket.is_empty());
    }
}
