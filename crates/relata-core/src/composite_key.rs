//! Composite keys: one hash over every field of a tuple
//!
//! The composite hash folds per-field hashes (each produced by that field's comparer) in
//! position order, so `(a, b)` and `(b, a)` hash differently. Equal tuples always share
//! a composite hash; distinct tuples may collide and are told apart by full field-wise
//! equality in the tuple set.

use crate::constants::hashing::{COMPOSITE_MULTIPLIER, COMPOSITE_SEED};

/// Rolling, order-sensitive combiner for per-field hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeHasher {
    state: u64,
}

impl CompositeHasher {
    pub const fn new() -> Self {
        Self { state: COMPOSITE_SEED }
    }

    /// Fold the next field's hash into the key
    #[inline]
    pub const fn write_field(&mut self, field_hash: u64) {
        self.state = (self.state.rotate_left(5) ^ field_hash).wrapping_mul(COMPOSITE_MULTIPLIER);
    }

    #[inline]
    pub const fn finish(&self) -> u64 {
        self.state
    }
}

impl Default for CompositeHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composite(field_hashes: &[u64]) -> u64 {
        let mut hasher = CompositeHasher::new();
        for &field_hash in field_hashes {
            hasher.write_field(field_hash);
        }
        hasher.finish()
    }

    #[test]
    fn test_composite_is_deterministic() {
        assert_eq!(composite(&[1, 2, 3]), composite(&[1, 2, 3]));
        assert_eq!(CompositeHasher::default().finish(), COMPOSITE_SEED);
    }

    #[test]
    fn test_composite_is_order_sensitive() {
        assert_ne!(composite(&[1, 2]), composite(&[2, 1]));
        assert_ne!(composite(&[7, 7]), composite(&[7]));
    }
}
