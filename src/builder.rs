//! Cache builder.
//!
//! Collects capacity, shard count, name and eviction policy, validates them
//! together and constructs a [`Cache`].
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use shardcache::builder::CacheBuilder;
//! use shardcache::config::LfuConfig;
//!
//! let cache = CacheBuilder::new(1_000)
//!     .with_name("thumbnails")
//!     .with_shards(16)
//!     .with_eviction_config(LfuConfig::default())
//!     .build::<Bytes, Bytes>()
//!     .unwrap();
//!
//! assert_eq!(cache.capacity(), 1_000);
//! assert_eq!(cache.shards(), 16);
//! assert_eq!(cache.policy(), "lfu");
//! ```

use std::hash::Hash;

use crate::cache::Cache;
use crate::config::EvictionConfig;
use crate::error::ConfigError;

const DEFAULT_NAME: &str = "shardcache";
const DEFAULT_SHARDS: usize = 1;

/// Builder for [`Cache`] instances.
///
/// `build` borrows the builder, so one builder can produce several
/// independent caches and stays usable after a failed build.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheBuilder {
    name: String,
    capacity: usize,
    shards: usize,
    eviction_config: EvictionConfig,
}

impl CacheBuilder {
    /// Starts a builder for a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            capacity,
            shards: DEFAULT_SHARDS,
            eviction_config: EvictionConfig::default(),
        }
    }

    /// Name reported in logs and metrics labels.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of independently locked partitions.
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    pub fn with_eviction_config(mut self, config: impl Into<EvictionConfig>) -> Self {
        self.eviction_config = config.into();
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shards(&self) -> usize {
        self.shards
    }

    pub fn eviction_config(&self) -> &EvictionConfig {
        &self.eviction_config
    }

    /// Checks every setting without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new(
                "capacity",
                "capacity must be greater than zero",
            ));
        }
        if self.shards == 0 {
            return Err(ConfigError::new(
                "shards",
                "shards must be greater than zero",
            ));
        }
        self.eviction_config.validate()
    }

    /// Validates the configuration and builds a cache.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid field.
    pub fn build<K, V>(&self) -> Result<Cache<K, V>, ConfigError>
    where
        K: Hash + Eq + Clone,
    {
        self.validate()?;

        tracing::debug!(
            name = %self.name,
            capacity = self.capacity,
            shards = self.shards,
            policy = self.eviction_config.name(),
            "building cache"
        );

        Ok(Cache::from_parts(
            self.name.clone(),
            self.capacity,
            self.shards,
            &self.eviction_config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::config::{FifoConfig, LfuConfig, LruConfig, S3FifoConfig};

    #[test]
    fn defaults() {
        let builder = CacheBuilder::new(10);
        assert_eq!(builder.shards(), 1);
        assert_eq!(builder.eviction_config(), &EvictionConfig::default());

        let cache = builder.build::<Bytes, Bytes>().unwrap();
        assert_eq!(cache.name(), "shardcache");
        assert_eq!(cache.policy(), "lru");
        assert_eq!(cache.usage(), 0);
    }

    #[test]
    fn all_policies_basic_ops() {
        let configs: [EvictionConfig; 4] = [
            FifoConfig::default().into(),
            S3FifoConfig::default().into(),
            LruConfig::default().into(),
            LfuConfig::default().into(),
        ];

        for config in configs {
            let cache = CacheBuilder::new(10)
                .with_eviction_config(config)
                .build::<u64, String>()
                .unwrap();

            cache.insert(1, "one".to_string());
            cache.insert(2, "two".to_string());
            assert_eq!(cache.get(&1), Some("one".to_string()));
            assert_eq!(cache.get(&3), None);
            assert!(cache.contains(&2));
            assert_eq!(cache.usage(), 2);

            cache.insert(1, "ONE".to_string());
            assert_eq!(cache.get(&1), Some("ONE".to_string()));

            cache.clear();
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn rejects_zero_capacity_and_shards() {
        let err = CacheBuilder::new(0).build::<u64, u64>().unwrap_err();
        assert_eq!(err.field(), "capacity");

        let err = CacheBuilder::new(10)
            .with_shards(0)
            .build::<u64, u64>()
            .unwrap_err();
        assert_eq!(err.field(), "shards");
    }

    #[test]
    fn rejects_invalid_policy_parameters() {
        let builder = CacheBuilder::new(10).with_eviction_config(LruConfig {
            high_priority_pool_ratio: 1.5,
        });
        let err = builder.build::<u64, u64>().unwrap_err();
        assert_eq!(err.field(), "high_priority_pool_ratio");
        assert!(err.to_string().contains("high_priority_pool_ratio"));
    }

    #[test]
    fn huge_capacity_builds_without_reserving_it() {
        let configs: [EvictionConfig; 4] = [
            FifoConfig::default().into(),
            S3FifoConfig::default().into(),
            LruConfig::default().into(),
            LfuConfig::default().into(),
        ];

        for config in configs {
            let cache = CacheBuilder::new(usize::MAX / 2)
                .with_shards(4)
                .with_eviction_config(config)
                .build::<Bytes, Bytes>()
                .unwrap();
            assert_eq!(cache.capacity(), usize::MAX / 2);

            for i in 0..100u32 {
                cache.insert(Bytes::from(i.to_string()), Bytes::from_static(b"v"));
            }
            assert_eq!(cache.usage(), 100);
            assert_eq!(cache.get(b"42".as_slice()), Some(Bytes::from_static(b"v")));
        }
    }

    #[test]
    fn build_borrows_builder() {
        let builder = CacheBuilder::new(4).with_shards(2);
        let a = builder.build::<u64, u64>().unwrap();
        let b = builder.build::<u64, u64>().unwrap();
        a.insert(1, 1);
        assert!(!b.contains(&1));
    }
}
