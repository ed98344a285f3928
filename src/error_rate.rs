/// Error rate statistics used to derive the graph error limit.
/// Error values are quantized, so everything is computed from a fixed-size histogram
/// and memory does not grow with the number of overlaps.

use crate::best_edge::MAX_EVALUE;
use crate::overlaps::decode_evalue;

/// Scale factor turning a MAD into a standard deviation estimate for normal data.
const MAD_TO_SIGMA: f64 = 1.4826;

#[derive(Clone)]
pub struct EvalueHistogram {
    counts: Vec<u64>,
}

impl Default for EvalueHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalueHistogram {
    pub fn new() -> Self {
        Self { counts: vec![0; MAX_EVALUE as usize + 1] }
    }

    pub fn add(&mut self, evalue: u32) {
        self.counts[evalue.min(MAX_EVALUE) as usize] += 1;
    }

    pub fn merge(mut self, other: EvalueHistogram) -> Self {
        for (a, b) in self.counts.iter_mut().zip(other.counts) {
            *a += b;
        }
        self
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Lower median of the recorded values.
    fn median_of(counts: &[u64]) -> u32 {
        let n: u64 = counts.iter().sum();
        let half = n.div_ceil(2);
        let mut seen = 0;
        for (v, &c) in counts.iter().enumerate() {
            seen += c;
            if seen >= half && c > 0 {
                return v as u32;
            }
        }
        0
    }

    pub fn stats(&self) -> ErrorRateStats {
        let n = self.total();
        if n == 0 {
            return ErrorRateStats::default();
        }

        let sum: f64 = self.counts.iter().enumerate().map(|(v, &c)| v as f64 * c as f64).sum();
        let mean = sum / n as f64;

        let ss: f64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(v, &c)| c as f64 * (v as f64 - mean).powi(2))
            .sum();
        let stddev = if n > 1 { (ss / (n - 1) as f64).sqrt() } else { 0.0 };

        let median = Self::median_of(&self.counts);

        let mut deviations = vec![0u64; self.counts.len()];
        for (v, &c) in self.counts.iter().enumerate() {
            deviations[(v as i64 - median as i64).unsigned_abs() as usize] += c;
        }
        let mad = Self::median_of(&deviations);

        ErrorRateStats {
            count: n,
            mean: decode_evalue(1) * mean,
            stddev: decode_evalue(1) * stddev,
            median: decode_evalue(median),
            mad: decode_evalue(mad),
        }
    }
}

/// Summary of overlap error rates, as fractions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ErrorRateStats {
    pub count: u64,
    pub mean: f64,
    pub stddev: f64,
    pub median: f64,
    pub mad: f64,
}

impl ErrorRateStats {
    /// median + deviation * sigma, never above `ceiling`.
    /// sigma comes from the MAD, or from the standard deviation when the MAD is zero.
    pub fn error_limit(&self, deviation: f64, ceiling: f64) -> f64 {
        if self.count == 0 {
            return ceiling;
        }
        let sigma = if self.mad > 0.0 { MAD_TO_SIGMA * self.mad } else { self.stddev };
        (self.median + deviation * sigma).min(ceiling)
    }
}
