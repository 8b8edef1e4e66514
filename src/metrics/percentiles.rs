use hdrhistogram::Histogram;
use serde::Serialize;

/// Latency percentile breakdown for one class of shots.
/// Values are microseconds, extracted from an HdrHistogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileSet {
    pub count: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub stdev: f64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
}

impl PercentileSet {
    pub fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.len() == 0 {
            return Self::empty();
        }

        Self {
            count: hist.len(),
            min: hist.min(),
            max: hist.max(),
            mean: hist.mean(),
            stdev: hist.stdev(),
            p50: hist.value_at_percentile(50.0),
            p95: hist.value_at_percentile(95.0),
            p99: hist.value_at_percentile(99.0),
        }
    }

    /// All-zero placeholder for a class with no observations yet.
    pub fn empty() -> Self {
        Self {
            count: 0,
            min: 0,
            max: 0,
            mean: 0.0,
            stdev: 0.0,
            p50: 0,
            p95: 0,
            p99: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_histogram_yields_zeroes() {
        let hist = Histogram::<u64>::new(3).unwrap();
        let set = PercentileSet::from_histogram(&hist);
        assert!(set.is_empty());
        assert_eq!(set, PercentileSet::empty());
    }

    #[test]
    fn percentiles_are_ordered() {
        let mut hist = Histogram::<u64>::new(3).unwrap();
        for v in [100u64, 200, 300, 400, 500, 10_000] {
            hist.record(v).unwrap();
        }

        let set = PercentileSet::from_histogram(&hist);
        assert_eq!(set.count, 6);
        assert!(set.min <= set.p50);
        assert!(set.p50 <= set.p95);
        assert!(set.p95 <= set.p99);
        assert!(set.p99 <= set.max);
    }
}
