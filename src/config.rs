//! Eviction configuration value objects.
//!
//! [`EvictionConfig`] is a closed sum over the four supported policies, each
//! variant carrying its own parameter struct. The structs are plain `Copy`
//! values with public fields; they hold no cache state and are checked once,
//! when [`CacheBuilder::build`](crate::builder::CacheBuilder::build) runs.
//!
//! | Policy  | Config           | Parameters                                          |
//! |---------|------------------|-----------------------------------------------------|
//! | FIFO    | [`FifoConfig`]   | none                                                |
//! | S3-FIFO | [`S3FifoConfig`] | small / ghost queue ratios, small→main threshold    |
//! | LRU     | [`LruConfig`]    | high-priority pool ratio                            |
//! | LFU     | [`LfuConfig`]    | window / protected ratios, sketch eps / confidence  |
//!
//! All configs implement `serde` so a host layer can load them from a file:
//!
//! ```
//! use shardcache::config::{EvictionConfig, LruConfig};
//!
//! let cfg = EvictionConfig::lru(LruConfig { high_priority_pool_ratio: 0.5 });
//! assert!(cfg.validate().is_ok());
//! assert_eq!(cfg.name(), "lru");
//! ```

use serde::{Deserialize, Serialize};

use crate::ds::count_min_sketch::{CountMinSketch, MAX_TABLE_SIZE};
use crate::error::ConfigError;

/// FIFO takes no parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FifoConfig {}

impl FifoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Parameters of the S3-FIFO policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3FifoConfig {
    /// Share of shard capacity given to the small (probationary) queue. The
    /// main queue gets the rest.
    pub small_queue_capacity_ratio: f64,
    /// Ghost queue size as a share of shard capacity. Holds fingerprints only.
    pub ghost_queue_capacity_ratio: f64,
    /// Accesses needed for a small-queue entry to move to main instead of
    /// being evicted.
    pub small_to_main_freq_threshold: u32,
}

impl Default for S3FifoConfig {
    fn default() -> Self {
        Self {
            small_queue_capacity_ratio: 0.1,
            ghost_queue_capacity_ratio: 0.1,
            small_to_main_freq_threshold: 1,
        }
    }
}

impl S3FifoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_ratio("small_queue_capacity_ratio", self.small_queue_capacity_ratio)?;
        ConfigError::check_ratio("ghost_queue_capacity_ratio", self.ghost_queue_capacity_ratio)?;
        if self.small_to_main_freq_threshold == 0 {
            return Err(ConfigError::new(
                "small_to_main_freq_threshold",
                "small_to_main_freq_threshold must be a positive integer",
            ));
        }
        Ok(())
    }
}

/// Parameters of the LRU policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LruConfig {
    /// Share of shard capacity reserved for entries that were hit at least
    /// once after insertion.
    pub high_priority_pool_ratio: f64,
}

impl Default for LruConfig {
    fn default() -> Self {
        Self {
            high_priority_pool_ratio: 0.9,
        }
    }
}

impl LruConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_ratio("high_priority_pool_ratio", self.high_priority_pool_ratio)
    }
}

/// Parameters of the LFU policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LfuConfig {
    /// Share of shard capacity for the admission window.
    pub window_capacity_ratio: f64,
    /// Share of shard capacity for the protected segment. The probationary
    /// segment gets what the window and protected segments leave.
    pub protected_capacity_ratio: f64,
    /// Count-min sketch error bound, relative to total increments.
    pub cmsketch_eps: f64,
    /// Probability that the sketch stays within `cmsketch_eps`.
    pub cmsketch_confidence: f64,
}

impl Default for LfuConfig {
    fn default() -> Self {
        Self {
            window_capacity_ratio: 0.1,
            protected_capacity_ratio: 0.8,
            cmsketch_eps: 0.001,
            cmsketch_confidence: 0.9,
        }
    }
}

impl LfuConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_ratio("window_capacity_ratio", self.window_capacity_ratio)?;
        ConfigError::check_ratio("protected_capacity_ratio", self.protected_capacity_ratio)?;
        let total = self.window_capacity_ratio + self.protected_capacity_ratio;
        if total > 1.0 {
            return Err(ConfigError::new(
                "protected_capacity_ratio",
                format!(
                    "window_capacity_ratio + protected_capacity_ratio must not exceed 1.0, got {total}"
                ),
            ));
        }
        ConfigError::check_open_unit("cmsketch_eps", self.cmsketch_eps)?;
        ConfigError::check_open_unit("cmsketch_confidence", self.cmsketch_confidence)?;
        if CountMinSketch::table_size(self.cmsketch_eps, self.cmsketch_confidence).is_none() {
            return Err(ConfigError::new(
                "cmsketch_eps",
                format!(
                    "cmsketch_eps {} needs a sketch larger than {MAX_TABLE_SIZE} counters",
                    self.cmsketch_eps
                ),
            ));
        }
        Ok(())
    }
}

/// Which eviction policy a cache uses, with that policy's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum EvictionConfig {
    Fifo(FifoConfig),
    S3Fifo(S3FifoConfig),
    Lru(LruConfig),
    Lfu(LfuConfig),
}

impl EvictionConfig {
    pub fn fifo(config: FifoConfig) -> Self {
        Self::Fifo(config)
    }

    pub fn s3fifo(config: S3FifoConfig) -> Self {
        Self::S3Fifo(config)
    }

    pub fn lru(config: LruConfig) -> Self {
        Self::Lru(config)
    }

    pub fn lfu(config: LfuConfig) -> Self {
        Self::Lfu(config)
    }

    /// Short policy name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fifo(_) => "fifo",
            Self::S3Fifo(_) => "s3fifo",
            Self::Lru(_) => "lru",
            Self::Lfu(_) => "lfu",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Fifo(cfg) => cfg.validate(),
            Self::S3Fifo(cfg) => cfg.validate(),
            Self::Lru(cfg) => cfg.validate(),
            Self::Lfu(cfg) => cfg.validate(),
        }
    }
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self::Lru(LruConfig::default())
    }
}

impl From<FifoConfig> for EvictionConfig {
    fn from(config: FifoConfig) -> Self {
        Self::Fifo(config)
    }
}

impl From<S3FifoConfig> for EvictionConfig {
    fn from(config: S3FifoConfig) -> Self {
        Self::S3Fifo(config)
    }
}

impl From<LruConfig> for EvictionConfig {
    fn from(config: LruConfig) -> Self {
        Self::Lru(config)
    }
}

impl From<LfuConfig> for EvictionConfig {
    fn from(config: LfuConfig) -> Self {
        Self::Lfu(config)
    }
}
