//! Equality comparers used by fields, field indices and composite keys.

use std::fmt;
use std::hash::{BuildHasher, Hash};

/// Hash reported for values a comparer classifies as absent.
pub const ABSENT_HASH: u64 = 0x9e37_79b9_7f4a_7c15;

// Fixed seeds keep hashes stable for the lifetime of the process, independent of
// which comparer instance produced them.
const SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Equality and hashing strategy for one field type.
///
/// Implementations must be consistent: `equals(a, b)` implies `hash(a) == hash(b)`.
/// A panicking comparer aborts the calling relation operation; nothing is recovered.
pub trait Comparer<T>: Send + Sync {
    /// Field-level equality.
    fn equals(&self, left: &T, right: &T) -> bool;

    /// Field-level hash, deterministic for equal values.
    fn hash(&self, value: &T) -> u64;

    /// Whether `value` is the field's "no value" sentinel.
    ///
    /// Field indices keep absent values in a dedicated slot that never collides with a
    /// real value.
    fn is_absent(&self, _value: &T) -> bool {
        false
    }
}

/// Natural `Eq + Hash` comparer, hashing with a fixed-seed `ahash` state.
#[derive(Clone)]
pub struct DefaultComparer {
    state: ahash::RandomState,
}

impl DefaultComparer {
    /// Create the natural comparer.
    pub fn new() -> Self {
        Self { state: ahash::RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3]) }
    }
}

impl Default for DefaultComparer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DefaultComparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultComparer")
    }
}

impl<T: Eq + Hash> Comparer<T> for DefaultComparer {
    fn equals(&self, left: &T, right: &T) -> bool {
        left == right
    }

    fn hash(&self, value: &T) -> u64 {
        BuildHasher::hash_one(&self.state, value)
    }
}

/// Null-aware wrapper for `Option<T>` fields.
///
/// `None` is reported as absent and hashes to [`ABSENT_HASH`]; `Some` values defer to the
/// inner comparer.
#[derive(Debug, Clone, Default)]
pub struct OptionComparer<C> {
    inner: C,
}

impl<C> OptionComparer<C> {
    /// Wrap a comparer for the non-null case.
    pub const fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<T, C: Comparer<T>> Comparer<Option<T>> for OptionComparer<C> {
    fn equals(&self, left: &Option<T>, right: &Option<T>) -> bool {
        match (left, right) {
            (Some(l), Some(r)) => self.inner.equals(l, r),
            (None, None) => true,
            _ => false,
        }
    }

    fn hash(&self, value: &Option<T>) -> u64 {
        value.as_ref().map_or(ABSENT_HASH, |v| self.inner.hash(v))
    }

    fn is_absent(&self, value: &Option<T>) -> bool {
        value.is_none()
    }
}

/// Comparer assembled from a pair of closures.
pub struct FnComparer<E, H> {
    eq: E,
    hash: H,
}

impl<E, H> FnComparer<E, H> {
    /// Build a comparer from an equality and a hash function.
    pub const fn new(eq: E, hash: H) -> Self {
        Self { eq, hash }
    }
}

impl<E, H> fmt::Debug for FnComparer<E, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparer")
    }
}

impl<T, E, H> Comparer<T> for FnComparer<E, H>
where
    E: Fn(&T, &T) -> bool + Send + Sync,
    H: Fn(&T) -> u64 + Send + Sync,
{
    fn equals(&self, left: &T, right: &T) -> bool {
        (self.eq)(left, right)
    }

    fn hash(&self, value: &T) -> u64 {
        (self.hash)(value)
    }
}
