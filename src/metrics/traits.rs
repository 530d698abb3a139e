//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and export are split into small traits so shard
//! code only ever writes counters and monitoring code only ever reads them.
//!
//! ```text
//!   ┌──────────────────────────┐
//!   │   CoreMetricsRecorder    │  written by a shard under its write lock
//!   │ get_hit / get_miss /     │
//!   │ insert / evict / remove  │
//!   └────────────┬─────────────┘
//!                │ per-shard counters
//!                ▼
//!   ┌──────────────────────────┐     ┌──────────────────────────┐
//!   │ MetricsSnapshotProvider  │ ──► │   MetricsExporter<S>     │
//!   │ Cache::metrics()         │     │   Prometheus text        │
//!   └──────────────────────────┘     └──────────────────────────┘
//! ```

/// Counters every shard records, whatever its eviction policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entries(&mut self, count: u64);
    fn record_remove(&mut self);
    fn record_clear(&mut self);
}

/// Point-in-time read of recorded counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Export/publish metrics to monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
