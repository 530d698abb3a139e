//! Count-min sketch with periodic halving.
//!
//! Approximates how often each key was seen using a `depth × width` table of
//! saturating 8-bit counters. Estimates never under-count; with probability
//! `confidence` they over-count by at most `eps × total increments`.
//!
//! ## Dimensions
//!
//! ```text
//!   width = ⌈e / eps⌉
//!   depth = ⌈ln(1 / (1 - confidence))⌉
//!
//!   eps = 0.001, confidence = 0.9  ─►  width 2719, depth 3
//! ```
//!
//! Both are clamped to at least 1, so any `(eps, confidence)` pair in
//! `(0, 1)` yields the same table shape on every construction. The table
//! never holds more than [`MAX_TABLE_SIZE`] counters; use
//! [`CountMinSketch::table_size`] to check parameters up front.
//!
//! ## Decay
//!
//! The sketch counts increments. Once `decay_threshold` increments have been
//! recorded every counter is halved, and so is the increment count. Old
//! popularity fades instead of pinning keys forever.
//!
//! ## Hashing
//!
//! Callers pass the key's 64-bit hash. Row `i` uses column
//! `(h1 + i * h2) % width`, where `h1`/`h2` are the two halves of the
//! re-mixed hash.

/// Upper bound on `width * depth`: 256 MiB of counters.
pub const MAX_TABLE_SIZE: usize = 1 << 28;

/// Count-min frequency sketch keyed by 64-bit hashes.
#[derive(Debug, Clone)]
pub struct CountMinSketch {
    table: Vec<u8>,
    width: usize,
    depth: usize,
    additions: u64,
    decay_threshold: u64,
}

impl CountMinSketch {
    /// Creates a sketch sized for the given error bound and confidence.
    ///
    /// Both arguments are expected in `(0, 1)`; callers validate them first
    /// (see [`LfuConfig::validate`](crate::config::LfuConfig::validate)).
    /// `decay_threshold` is the number of increments between halvings; 0
    /// disables decay. Parameters that would exceed [`MAX_TABLE_SIZE`] get
    /// the widest table that fits.
    pub fn new(eps: f64, confidence: f64, decay_threshold: u64) -> Self {
        let (width, depth) = Self::dimensions(eps, confidence);
        let depth = depth.min(MAX_TABLE_SIZE);
        let width = width.min(MAX_TABLE_SIZE / depth);
        Self {
            table: vec![0; width * depth],
            width,
            depth,
            additions: 0,
            decay_threshold,
        }
    }

    /// Computes `(width, depth)` for the given parameters.
    pub fn dimensions(eps: f64, confidence: f64) -> (usize, usize) {
        let width = (std::f64::consts::E / eps).ceil();
        let depth = (1.0 / (1.0 - confidence)).ln().ceil();
        (to_dimension(width), to_dimension(depth))
    }

    /// Number of counters the parameters call for, or `None` when that is
    /// more than [`MAX_TABLE_SIZE`].
    pub fn table_size(eps: f64, confidence: f64) -> Option<usize> {
        let (width, depth) = Self::dimensions(eps, confidence);
        width
            .checked_mul(depth)
            .filter(|&size| size <= MAX_TABLE_SIZE)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of increments recorded since the last halving.
    pub fn additions(&self) -> u64 {
        self.additions
    }

    /// Records one occurrence of `hash`.
    pub fn increment(&mut self, hash: u64) {
        let (h1, h2) = split(hash);
        for row in 0..self.depth {
            let idx = self.index(row, h1, h2);
            self.table[idx] = self.table[idx].saturating_add(1);
        }

        self.additions += 1;
        if self.decay_threshold > 0 && self.additions >= self.decay_threshold {
            self.halve();
        }
    }

    /// Returns the estimated number of occurrences of `hash`.
    pub fn estimate(&self, hash: u64) -> u8 {
        let (h1, h2) = split(hash);
        (0..self.depth)
            .map(|row| self.table[self.index(row, h1, h2)])
            .min()
            .unwrap_or(0)
    }

    /// Halves every counter and the increment count.
    pub fn halve(&mut self) {
        for counter in &mut self.table {
            *counter >>= 1;
        }
        self.additions >>= 1;
    }

    pub fn clear(&mut self) {
        self.table.fill(0);
        self.additions = 0;
    }

    #[inline]
    fn index(&self, row: usize, h1: u64, h2: u64) -> usize {
        let col = h1.wrapping_add((row as u64).wrapping_mul(h2)) % self.width as u64;
        row * self.width + col as usize
    }
}

fn to_dimension(value: f64) -> usize {
    if value.is_finite() && value >= 1.0 {
        value as usize
    } else {
        1
    }
}

/// Re-mixes the hash (the shard index consumed its low bits) and splits it
/// into the two double-hashing halves. `h2` is forced odd so rows differ.
#[inline]
fn split(hash: u64) -> (u64, u64) {
    let mut h = hash ^ (hash >> 33);
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    (h & 0xffff_ffff, (h >> 32) | 1)
}
