use std::io::Write;

use parking_lot::Mutex;

use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for cache metrics snapshots.
///
/// Writes the text exposition format so the output can be scraped directly
/// or forwarded to an OpenTelemetry collector. Every sample carries a
/// `cache="<name>"` label when a name is set.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    cache_name: Option<String>,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            cache_name: None,
            writer: Mutex::new(writer),
        }
    }

    /// Labels every sample with `cache="<name>"`.
    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = Some(name.into());
        self
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_sample(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let labels = match &self.cache_name {
            Some(cache) => format!("{{cache=\"{cache}\"}}"),
            None => String::new(),
        };
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {name} {kind}");
        let _ = writeln!(writer, "{name}{labels} {value}");
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<CacheMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &CacheMetricsSnapshot) {
        self.write_sample("counter", "get_calls_total", snapshot.get_calls);
        self.write_sample("counter", "get_hits_total", snapshot.get_hits);
        self.write_sample("counter", "get_misses_total", snapshot.get_misses);
        self.write_sample("counter", "insert_calls_total", snapshot.insert_calls);
        self.write_sample("counter", "insert_new_total", snapshot.insert_new);
        self.write_sample("counter", "insert_updates_total", snapshot.insert_updates);
        self.write_sample("counter", "evicted_entries_total", snapshot.evicted_entries);
        self.write_sample("counter", "removes_total", snapshot.removes);
        self.write_sample("counter", "clears_total", snapshot.clears);
        self.write_sample("gauge", "usage", snapshot.usage as u64);
        self.write_sample("gauge", "capacity", snapshot.capacity as u64);
    }
}
