//! Shared, immutable view of a cached key/value pair.

use std::fmt;
use std::sync::Arc;

struct EntryInner<K, V> {
    key: K,
    value: V,
}

/// A key/value pair as stored in the cache.
///
/// Cloning is a reference-count bump. A handle stays valid after the entry
/// is overwritten, removed or evicted; it simply no longer reflects what the
/// cache holds.
///
/// ```
/// use bytes::Bytes;
/// use shardcache::cache::ByteCache;
///
/// let cache = ByteCache::new(10).unwrap();
/// let entry = cache.insert(Bytes::from_static(b"k"), Bytes::from_static(b"v"));
/// assert_eq!(entry.key().as_ref(), b"k");
/// assert_eq!(entry.value().as_ref(), b"v");
/// ```
pub struct CacheEntry<K, V> {
    inner: Arc<EntryInner<K, V>>,
}

impl<K, V> CacheEntry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            inner: Arc::new(EntryInner { key, value }),
        }
    }

    #[inline]
    pub fn key(&self) -> &K {
        &self.inner.key
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.inner.value
    }

    /// Returns `true` if both handles point at the same stored entry.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<K, V> Clone for CacheEntry<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for CacheEntry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.value() == other.value()
    }
}

impl<K: Eq, V: Eq> Eq for CacheEntry<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CacheEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", self.key())
            .field("value", self.value())
            .finish()
    }
}
