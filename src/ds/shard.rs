//! Deterministic key hashing and shard routing.
//!
//! The cache hashes every key exactly once per operation. The resulting
//! 64-bit hash picks the shard and is then passed down to the eviction
//! policy, which uses it as the key's fingerprint (S3-FIFO ghost list, LFU
//! frequency sketch).
//!
//! ```text
//!   key ──► SipHash(seed, key) ──► hash ──┬──► hash % shards ──► shard index
//!                                         └──► policy fingerprint
//! ```
//!
//! Properties
//! - Deterministic: same `(key, seed, shards)` always yields the same shard.
//! - A key and any borrowed form of it (`Bytes` / `[u8]`) hash identically,
//!   as required by the `Borrow` contract.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic shard selector using a seeded hash.
///
/// # Example
///
/// ```
/// use shardcache::ds::ShardSelector;
///
/// let selector = ShardSelector::new(8, 42);
/// let hash = selector.hash_key(b"user:123".as_slice());
/// let shard = selector.shard_for_hash(hash);
/// assert!(shard < 8);
/// assert_eq!(selector.shard_for_key(b"user:123".as_slice()), shard);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards. The shard count is clamped to
    /// at least 1.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Hashes a key (or any borrowed form of it) to 64 bits.
    pub fn hash_key<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// Maps a hash produced by [`hash_key`](Self::hash_key) to `[0, shards)`.
    #[inline]
    pub fn shard_for_hash(&self, hash: u64) -> usize {
        (hash % self.shards as u64) as usize
    }

    pub fn shard_for_key<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        self.shard_for_hash(self.hash_key(key))
    }
}

impl Default for ShardSelector {
    /// Creates a single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn selection_is_deterministic() {
        let selector = ShardSelector::new(8, 123);
        let a = selector.shard_for_key("key");
        let b = selector.shard_for_key("key");
        assert_eq!(a, b);
        assert!(a < selector.shard_count());
        assert_eq!(ShardSelector::new(8, 123), selector);
    }

    #[test]
    fn zero_shards_clamps_to_one() {
        let selector = ShardSelector::new(0, 0);
        assert_eq!(selector.shard_count(), 1);
        assert_eq!(selector.shard_for_key("anything"), 0);
        assert_eq!(ShardSelector::default().shard_count(), 1);
    }

    #[test]
    fn owned_and_borrowed_bytes_agree() {
        let selector = ShardSelector::new(16, 7);
        let owned = Bytes::from_static(b"key_42");
        let borrowed: &[u8] = b"key_42";
        assert_eq!(selector.hash_key(&owned), selector.hash_key(borrowed));
    }

    #[test]
    fn keys_spread_over_shards() {
        let selector = ShardSelector::new(4, 0);
        let mut counts = [0usize; 4];
        for i in 0..4000 {
            counts[selector.shard_for_key(format!("key_{i}").as_bytes())] += 1;
        }
        for count in counts {
            assert!(count > 500, "uneven distribution: {counts:?}");
        }
    }
}
