use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use chrono::{DateTime, Utc};
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::Serialize;

use super::percentiles::PercentileSet;
use crate::aggregator::Aggregator;
use crate::sample::Sample;

// ─── Configuration ───────────────────────────────────────────────

/// How many individual shot records we keep for the live feed
const MAX_RECENT_SAMPLES: usize = 256;

/// Timeline resolution (one aggregated point per window)
const TIMELINE_WINDOW_MS: u64 = 1_000;

/// HdrHistogram range: 1 μs → 60 s, 3 significant figures
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 60_000_000;
const HIST_SIGFIG: u8 = 3;

// ─── Public types ────────────────────────────────────────────────

/// The built-in [`Aggregator`]: thread-safe sink that folds samples
/// into histograms, counters, and a rolling live feed.
///
/// Guns call `report()` from any number of concurrent shots; whoever
/// owns the run calls `snapshot()` for a consistent read and `reset()`
/// between runs.
pub struct SampleCollector {
    inner: Mutex<Inner>,
}

/// Shot/error counters for one ammo tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub shots: u64,
    pub errors: u64,
}

/// A single entry in the live shot feed.
#[derive(Debug, Clone, Serialize)]
pub struct SampleRecord {
    /// Milliseconds since the first reported sample.
    pub offset_ms: u64,
    pub tags: Vec<String>,
    pub status_code: u16,
    pub latency_us: u64,
}

/// One aggregated point on the timeline (per one-second window).
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    pub offset_ms: u64,
    pub avg_latency_us: f64,
    pub shots: u64,
    pub errors: u64,
}

/// A bucket in the latency distribution.
#[derive(Debug, Clone, Serialize)]
pub struct DistBucket {
    pub range_start_us: u64,
    pub range_end_us: u64,
    pub count: u64,
}

/// Complete read-only view of everything collected so far.
#[derive(Debug, Clone, Serialize)]
pub struct CollectorSnapshot {
    /// Latency percentiles of successful shots.
    pub ok: PercentileSet,
    /// Latency percentiles of failed shots.
    pub err: PercentileSet,

    pub total_shots: u64,
    pub total_errors: u64,
    pub shots_per_sec: f64,
    pub elapsed_secs: f64,
    /// Wall-clock time of the first reported sample.
    pub started_at: Option<DateTime<Utc>>,

    pub per_tag: BTreeMap<String, TagCount>,
    pub recent_samples: Vec<SampleRecord>,
    pub timeline: Vec<TimelinePoint>,
    pub distribution: Vec<DistBucket>,
}

// ─── Internal state ──────────────────────────────────────────────

struct Inner {
    ok_hist: Histogram<u64>,
    err_hist: Histogram<u64>,
    all_hist: Histogram<u64>,

    total_shots: u64,
    total_errors: u64,
    per_tag: BTreeMap<String, TagCount>,

    recent_samples: VecDeque<SampleRecord>,

    timeline: Vec<TimelinePoint>,
    current_window: Option<WindowAccumulator>,

    // Anchors set lazily on the first sample
    start_time: Option<Instant>,
    started_at: Option<DateTime<Utc>>,
}

/// Running totals for the current timeline window.
struct WindowAccumulator {
    window_start_ms: u64,
    latency_sum_us: u64,
    shots: u64,
    errors: u64,
}

impl WindowAccumulator {
    /// Start a new window from its first sample.
    fn first(window_start_ms: u64, latency_us: u64, failed: bool) -> Self {
        Self {
            window_start_ms,
            latency_sum_us: latency_us,
            shots: 1,
            errors: failed as u64,
        }
    }
}

// ─── SampleCollector impl ────────────────────────────────────────

impl SampleCollector {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Wipe all data, e.g. when a new run starts.
    pub fn reset(&self) {
        *self.inner.lock() = Inner::new();
    }

    /// Produce a consistent read-only snapshot.
    pub fn snapshot(&self) -> CollectorSnapshot {
        self.inner.lock().snapshot()
    }
}

impl Default for SampleCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator for SampleCollector {
    fn report(&self, sample: Sample) {
        self.inner.lock().record(sample);
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

fn new_hist() -> Histogram<u64> {
    Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
        .expect("histogram creation")
}

impl Inner {
    fn new() -> Self {
        Self {
            ok_hist: new_hist(),
            err_hist: new_hist(),
            all_hist: new_hist(),
            total_shots: 0,
            total_errors: 0,
            per_tag: BTreeMap::new(),
            recent_samples: VecDeque::with_capacity(MAX_RECENT_SAMPLES + 1),
            timeline: Vec::new(),
            current_window: None,
            start_time: None,
            started_at: None,
        }
    }

    fn record(&mut self, sample: Sample) {
        // Lazily set both anchors on the very first sample
        let start = *self.start_time.get_or_insert_with(Instant::now);
        self.started_at.get_or_insert_with(Utc::now);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let failed = !sample.is_ok();

        // ── Counters ────────────────────────────────────────────
        self.total_shots += 1;
        if failed {
            self.total_errors += 1;
        }
        if let Some(tag) = sample.tags().first() {
            let entry = self.per_tag.entry(tag.clone()).or_default();
            entry.shots += 1;
            if failed {
                entry.errors += 1;
            }
        }

        // ── Histograms (clamp to ≥ 1 μs) ───────────────────────
        let latency_us = (sample.latency().as_micros() as u64).max(1);
        if failed {
            let _ = self.err_hist.record(latency_us);
        } else {
            let _ = self.ok_hist.record(latency_us);
        }
        let _ = self.all_hist.record(latency_us);

        // ── Timeline aggregation ────────────────────────────────
        self.push_to_timeline(elapsed_ms, latency_us, failed);

        // ── Live shot feed ──────────────────────────────────────
        self.recent_samples.push_back(SampleRecord {
            offset_ms: elapsed_ms,
            tags: sample.tags().to_vec(),
            status_code: sample.status_code(),
            latency_us,
        });
        if self.recent_samples.len() > MAX_RECENT_SAMPLES {
            self.recent_samples.pop_front();
        }
    }

    /// Bucket the sample into the current window, or roll over.
    fn push_to_timeline(&mut self, elapsed_ms: u64, latency_us: u64, failed: bool) {
        let window_start = (elapsed_ms / TIMELINE_WINDOW_MS) * TIMELINE_WINDOW_MS;

        match &mut self.current_window {
            // Same window, keep accumulating
            Some(w) if w.window_start_ms == window_start => {
                w.latency_sum_us += latency_us;
                w.shots += 1;
                if failed {
                    w.errors += 1;
                }
            }
            // New window: finalize the old one, start fresh
            Some(_) => {
                let old = self.current_window.take().unwrap();
                self.timeline.push(Self::finalize_window(old));
                self.current_window = Some(WindowAccumulator::first(
                    window_start,
                    latency_us,
                    failed,
                ));
            }
            // Very first sample
            None => {
                self.current_window = Some(WindowAccumulator::first(
                    window_start,
                    latency_us,
                    failed,
                ));
            }
        }
    }

    fn finalize_window(w: WindowAccumulator) -> TimelinePoint {
        TimelinePoint {
            offset_ms: w.window_start_ms,
            avg_latency_us: w.latency_sum_us as f64 / w.shots.max(1) as f64,
            shots: w.shots,
            errors: w.errors,
        }
    }

    fn snapshot(&self) -> CollectorSnapshot {
        let elapsed_secs = self
            .start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        let shots_per_sec = if elapsed_secs > 0.0 {
            self.total_shots as f64 / elapsed_secs
        } else {
            0.0
        };

        // Include the current (partial) window in the timeline
        let mut timeline = self.timeline.clone();
        if let Some(w) = &self.current_window {
            timeline.push(TimelinePoint {
                offset_ms: w.window_start_ms,
                avg_latency_us: w.latency_sum_us as f64 / w.shots.max(1) as f64,
                shots: w.shots,
                errors: w.errors,
            });
        }

        CollectorSnapshot {
            ok: PercentileSet::from_histogram(&self.ok_hist),
            err: PercentileSet::from_histogram(&self.err_hist),
            total_shots: self.total_shots,
            total_errors: self.total_errors,
            shots_per_sec,
            elapsed_secs,
            started_at: self.started_at,
            per_tag: self.per_tag.clone(),
            recent_samples: self.recent_samples.iter().cloned().collect(),
            timeline,
            distribution: Self::compute_distribution(&self.all_hist),
        }
    }

    // ── Latency distribution ────────────────────────────────────

    /// Bucket boundaries (μs) sized for a database round trip over a
    /// network, from sub-millisecond up to multi-second outliers.
    const DIST_BOUNDARIES: &'static [u64] = &[
        100, 250, 500, 1_000, 2_500, 5_000, 10_000, 25_000, 50_000, 100_000,
        250_000, 500_000, 1_000_000, 5_000_000,
    ];

    fn compute_distribution(hist: &Histogram<u64>) -> Vec<DistBucket> {
        if hist.len() == 0 {
            return Vec::new();
        }

        let bounds = Self::DIST_BOUNDARIES;
        let mut counts = vec![0u64; bounds.len() + 1];

        for iv in hist.iter_recorded() {
            let val = iv.value_iterated_to();
            let cnt = iv.count_at_value();

            // First boundary >= val picks the bucket
            let idx = match bounds.binary_search(&val) {
                Ok(i) => i,
                Err(i) => i,
            };
            counts[idx.min(bounds.len())] += cnt;
        }

        let mut result = Vec::with_capacity(counts.len());
        let mut prev = 0u64;
        for (i, &boundary) in bounds.iter().enumerate() {
            if counts[i] > 0 {
                result.push(DistBucket {
                    range_start_us: prev,
                    range_end_us: boundary,
                    count: counts[i],
                });
            }
            prev = boundary;
        }
        // Overflow bucket
        if counts[bounds.len()] > 0 {
            result.push(DistBucket {
                range_start_us: prev,
                range_end_us: hist.max(),
                count: counts[bounds.len()],
            });
        }

        result
    }
}

// ─── Tests ───────────────────────────────────────────────────────
