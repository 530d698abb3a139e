/// Cache-wide counters, summed over shards, plus gauges taken at read time.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CacheMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_updates: u64,

    pub evicted_entries: u64,
    pub removes: u64,
    pub clears: u64,

    // gauges captured at snapshot time
    pub usage: usize,
    pub capacity: usize,
}

impl CacheMetricsSnapshot {
    /// Adds `other`'s counters and gauges to `self`.
    pub fn merge(&mut self, other: &Self) {
        self.get_calls += other.get_calls;
        self.get_hits += other.get_hits;
        self.get_misses += other.get_misses;
        self.insert_calls += other.insert_calls;
        self.insert_new += other.insert_new;
        self.insert_updates += other.insert_updates;
        self.evicted_entries += other.evicted_entries;
        self.removes += other.removes;
        self.clears += other.clears;
        self.usage += other.usage;
        self.capacity += other.capacity;
    }

    /// Fraction of `get` calls that hit, or 0 before the first call.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
