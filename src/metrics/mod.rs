//! Hit/miss/eviction counters (feature `metrics`).
//!
//! Each shard records into its own [`CacheMetrics`] while holding its write
//! lock. [`Cache::metrics`](crate::cache::Cache::metrics) sums the shards
//! into a [`CacheMetricsSnapshot`], which an exporter can publish.

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::CacheMetrics;
pub use snapshot::CacheMetricsSnapshot;
pub use traits::{CoreMetricsRecorder, MetricsExporter, MetricsSnapshotProvider};
