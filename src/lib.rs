//! shardcache: an in-process, sharded, capacity-bounded key/value cache with
//! pluggable eviction (FIFO, S3-FIFO, LRU with a high-priority pool, and
//! window-TinyLFU backed by a count-min sketch).
//!
//! ```
//! use bytes::Bytes;
//! use shardcache::prelude::*;
//!
//! let cache: ByteCache = CacheBuilder::new(1_000)
//!     .with_shards(8)
//!     .with_eviction_config(S3FifoConfig::default())
//!     .build()
//!     .unwrap();
//!
//! cache.insert(Bytes::from_static(b"k"), Bytes::from_static(b"v"));
//! assert_eq!(cache.get(b"k".as_slice()), Some(Bytes::from_static(b"v")));
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;

pub use builder::CacheBuilder;
pub use cache::{ByteCache, Cache, CacheEntry};
pub use config::{EvictionConfig, FifoConfig, LfuConfig, LruConfig, S3FifoConfig};
pub use error::ConfigError;
