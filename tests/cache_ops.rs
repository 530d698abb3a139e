// ==============================================
// CACHE OPERATION TESTS (integration)
// ==============================================
//
// Observable behavior of the public cache surface over byte keys/values.

use bytes::Bytes;
use proptest::prelude::*;
use shardcache::prelude::*;

fn bytes(s: &str) -> Bytes {
    Bytes::copy_from_slice(s.as_bytes())
}

fn key(i: usize) -> Bytes {
    bytes(&format!("key-{i}"))
}

// ==============================================
// Scenarios
// ==============================================

mod scenarios {
    use super::*;

    #[test]
    fn single_key_value() {
        let cache = ByteCache::new(10).unwrap();
        let entry = cache.insert(bytes("hello"), bytes("world"));
        assert_eq!(entry.key(), &bytes("hello"));
        assert_eq!(entry.value(), &bytes("world"));
        assert!(cache.contains(b"hello".as_slice()));
        assert_eq!(cache.get(b"hello".as_slice()), Some(bytes("world")));
    }

    #[test]
    fn usage_counts_each_insert_until_capacity() {
        let cache = ByteCache::new(1000).unwrap();
        for i in 0..500 {
            cache.insert(bytes(&format!("key_{i}")), bytes(&format!("value_{i}")));
            assert_eq!(cache.usage(), i + 1);
        }
        assert_eq!(cache.capacity(), 1000);
        for i in 0..500 {
            let value = cache.get(format!("key_{i}").as_bytes());
            assert_eq!(value, Some(bytes(&format!("value_{i}"))));
        }
    }

    #[test]
    fn remove_then_clear() {
        let cache = ByteCache::new(2000).unwrap();
        for i in 0..1000 {
            cache.insert(key(i), key(i));
        }
        assert_eq!(cache.usage(), 1000);

        let removed = cache.remove(&key(7)).unwrap();
        assert_eq!(removed.key(), &key(7));
        assert_eq!(removed.value(), &key(7));
        assert!(!cache.contains(&key(7)));
        assert_eq!(cache.usage(), 999);

        cache.clear();
        assert_eq!(cache.usage(), 0);
        for i in 0..1000 {
            assert!(!cache.contains(&key(i)));
        }
    }

    #[test]
    fn s3fifo_pure_scan_keeps_newest_keys() {
        let cache: ByteCache = CacheBuilder::new(10)
            .with_eviction_config(S3FifoConfig::default())
            .build()
            .unwrap();
        for i in 0..50 {
            cache.insert(key(i), bytes("v"));
            assert!(cache.usage() <= 10);
        }
        // Nothing was ever promoted, so the small queue evicted oldest first.
        for i in 0..40 {
            assert!(!cache.contains(&key(i)));
        }
        for i in 40..50 {
            assert!(cache.contains(&key(i)));
        }
    }

    #[test]
    fn s3fifo_scan_only_evicts_newcomers() {
        let cache: ByteCache = CacheBuilder::new(10)
            .with_eviction_config(S3FifoConfig::default())
            .build()
            .unwrap();
        for i in 0..10 {
            cache.insert(key(i), bytes("warm"));
        }
        for i in 0..10 {
            cache.get(&key(i));
        }
        for i in 100..130 {
            cache.insert(key(i), bytes("scan"));
            assert!(cache.usage() <= 10);
        }
        // Warm keys were promoted to main on their way out of the small queue;
        // the scan churns through the small queue only.
        let warm = (0..10).filter(|&i| cache.contains(&key(i))).count();
        assert!(warm >= 8, "only {warm} warm keys survived");
        assert!(cache.contains(&key(129)));
    }

    #[test]
    fn lfu_hot_key_survives_cold_flood() {
        let cache: ByteCache = CacheBuilder::new(10)
            .with_eviction_config(LfuConfig::default())
            .build()
            .unwrap();
        cache.insert(bytes("hot"), bytes("v"));
        for _ in 0..20 {
            assert!(cache.get(b"hot".as_slice()).is_some());
        }
        for i in 0..200 {
            cache.insert(key(i), bytes("cold"));
            assert!(cache.usage() <= 10);
        }
        assert!(cache.contains(b"hot".as_slice()));
    }

    #[test]
    fn fifo_evicts_in_insertion_order() {
        let cache: ByteCache = CacheBuilder::new(3)
            .with_eviction_config(FifoConfig::default())
            .build()
            .unwrap();
        for i in 0..3 {
            cache.insert(key(i), bytes("v"));
        }
        cache.get(&key(0));
        cache.insert(key(3), bytes("v"));
        assert!(!cache.contains(&key(0)));
        assert!(cache.contains(&key(1)));
        assert!(cache.contains(&key(3)));
    }

    #[test]
    fn lru_keeps_recently_read_key() {
        let cache: ByteCache = CacheBuilder::new(3)
            .with_eviction_config(LruConfig::default())
            .build()
            .unwrap();
        for i in 0..3 {
            cache.insert(key(i), bytes("v"));
        }
        cache.get(&key(0));
        cache.insert(key(3), bytes("v"));
        assert!(cache.contains(&key(0)));
        assert!(!cache.contains(&key(1)));
    }

    #[test]
    fn contains_leaves_eviction_order_alone() {
        let configs: [EvictionConfig; 3] = [
            LruConfig::default().into(),
            LfuConfig::default().into(),
            S3FifoConfig::default().into(),
        ];

        for config in configs {
            let name = config.name();
            let build = || -> ByteCache {
                CacheBuilder::new(8)
                    .with_eviction_config(config)
                    .build()
                    .unwrap()
            };
            let checked = build();
            let untouched = build();

            for i in 0..8 {
                checked.insert(key(i), bytes("v"));
                untouched.insert(key(i), bytes("v"));
            }
            for _ in 0..20 {
                assert!(checked.contains(&key(0)[..]));
            }
            for i in 8..40 {
                checked.insert(key(i), bytes("v"));
                untouched.insert(key(i), bytes("v"));
            }

            assert_eq!(checked.usage(), untouched.usage(), "{name}");
            for i in 0..40 {
                assert_eq!(
                    checked.contains(&key(i)[..]),
                    untouched.contains(&key(i)[..]),
                    "{name}: key-{i}"
                );
            }
        }
    }

    #[test]
    fn overwrite_returns_new_entry() {
        let cache = ByteCache::new(4).unwrap();
        let first = cache.insert(bytes("k"), bytes("v1"));
        let second = cache.insert(bytes("k"), bytes("v2"));
        assert!(!first.ptr_eq(&second));
        assert_eq!(first.value(), &bytes("v1"));
        assert_eq!(cache.get(b"k".as_slice()), Some(bytes("v2")));
        assert_eq!(cache.usage(), 1);
    }
}

// ==============================================
// Property Tests
// ==============================================

mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn distinct_inserts_within_capacity_are_all_kept(
            capacity in 1usize..300,
            fill in 0usize..300,
        ) {
            let cache = ByteCache::new(capacity).unwrap();
            let n = fill.min(capacity);
            for i in 0..n {
                cache.insert(key(i), bytes("v"));
            }
            prop_assert_eq!(cache.usage(), n);
        }

        #[test]
        fn insert_then_get_returns_exact_value(
            k in prop::collection::vec(any::<u8>(), 0..32),
            v in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let cache = ByteCache::new(4).unwrap();
            cache.insert(Bytes::from(k.clone()), Bytes::from(v.clone()));
            prop_assert_eq!(cache.get(k.as_slice()), Some(Bytes::from(v)));
        }

        #[test]
        fn remove_returns_inserted_entry(
            keys in prop::collection::hash_set(prop::collection::vec(any::<u8>(), 1..8), 1..20),
        ) {
            let cache = ByteCache::new(64).unwrap();
            for k in &keys {
                cache.insert(Bytes::from(k.clone()), Bytes::from(k.clone()));
            }
            for k in &keys {
                let removed = cache.remove(k.as_slice());
                prop_assert_eq!(removed.map(|e| e.value().clone()), Some(Bytes::from(k.clone())));
                prop_assert!(!cache.contains(k.as_slice()));
            }
            prop_assert!(cache.is_empty());
        }

        #[test]
        fn clear_forgets_all_keys(
            capacity in 1usize..100,
            shards in 1usize..8,
            count in 0usize..200,
        ) {
            let cache: ByteCache = CacheBuilder::new(capacity)
                .with_shards(shards)
                .build()
                .unwrap();
            for i in 0..count {
                cache.insert(key(i), bytes("v"));
            }
            cache.clear();
            prop_assert_eq!(cache.usage(), 0);
            for i in 0..count {
                prop_assert!(!cache.contains(&key(i)));
            }
        }
    }
}
