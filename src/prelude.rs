pub use crate::builder::CacheBuilder;
pub use crate::cache::{ByteCache, Cache, CacheEntry};
pub use crate::config::{EvictionConfig, FifoConfig, LfuConfig, LruConfig, S3FifoConfig};
pub use crate::error::ConfigError;
#[cfg(feature = "metrics")]
pub use crate::metrics::CacheMetricsSnapshot;
pub use crate::traits::EvictionPolicy;
